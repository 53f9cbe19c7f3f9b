//! 表单状态管理模块
//!
//! 将零散的 signal 整合为 `FormState` 结构体，负责：
//! 数据的持有与重置，以及提交前的校验。

use leptos::prelude::*;

use crate::validation::{Field, FieldErrors, validate_github_url};

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    pub github_url: RwSignal<String>,
    pub errors: RwSignal<FieldErrors>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            github_url: RwSignal::new(String::new()),
            errors: RwSignal::new(FieldErrors::default()),
        }
    }

    /// 重置表单到初始状态
    pub fn reset(&self) {
        self.github_url.set(String::new());
        self.errors.set(FieldErrors::default());
    }

    /// 校验并返回要提交的仓库地址；失败时记录错误
    pub fn submission(&self) -> Option<String> {
        let url = self.github_url.get_untracked().trim().to_string();
        let mut errors = FieldErrors::default();
        if let Err(message) = validate_github_url(&url) {
            errors.insert(Field::GithubUrl, message);
        }
        let valid = errors.is_empty();
        self.errors.set(errors);
        valid.then_some(url)
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
