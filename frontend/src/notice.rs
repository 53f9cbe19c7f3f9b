//! 行内提示消息
//!
//! 同一时间最多显示一条。成功消息 3 秒后自动清除，错误消息保留到
//! 用户关闭或被新消息替换。

use std::time::Duration;

use leptos::prelude::*;

use crate::api::ApiError;

pub const SUCCESS_AUTO_HIDE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeModel {
    current: Option<Notice>,
    next_id: u64,
}

impl NoticeModel {
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// 显示新消息；成功消息返回需要在多久之后调用 `expire`
    pub fn show(&mut self, kind: NoticeKind, text: impl Into<String>) -> Option<(NoticeId, Duration)> {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.current = Some(Notice {
            id,
            kind,
            text: text.into(),
        });
        match kind {
            NoticeKind::Success => Some((id, SUCCESS_AUTO_HIDE)),
            NoticeKind::Error => None,
        }
    }

    /// 定时器到期：仅当该消息仍在显示时清除
    pub fn expire(&mut self, id: NoticeId) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

/// 变更请求结果对应的提示；失败时附带后端给出的原因
pub fn mutation_notice<T>(
    result: &Result<T, ApiError>,
    success: &str,
    failure: &str,
) -> (NoticeKind, String) {
    match result {
        Ok(_) => (NoticeKind::Success, success.to_string()),
        Err(error) => {
            let reason = error.detail().map(str::to_string).unwrap_or_else(|| error.to_string());
            (NoticeKind::Error, format!("{}: {}", failure, reason))
        }
    }
}

/// 页面级提示槽位
#[derive(Clone, Copy)]
pub struct Notices {
    state: RwSignal<NoticeModel>,
}

impl Notices {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(NoticeModel::default()),
        }
    }

    pub fn current(&self) -> Option<Notice> {
        self.state.with(|s| s.current().cloned())
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NoticeKind::Error, text.into());
    }

    /// 按变更结果显示成功或错误
    pub fn report<T>(&self, result: &Result<T, ApiError>, success: &str, failure: &str) {
        let (kind, text) = mutation_notice(result, success, failure);
        self.show(kind, text);
    }

    fn show(&self, kind: NoticeKind, text: String) {
        let state = self.state;
        if let Some(Some((id, delay))) = state.try_update(|s| s.show(kind, text)) {
            set_timeout(
                move || {
                    state.try_update(|s| s.expire(id));
                },
                delay,
            );
        }
    }

    pub fn dismiss(&self) {
        self.state.try_update(|s| s.dismiss());
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_schedules_three_second_expiry() {
        let mut model = NoticeModel::default();
        let (id, delay) = model.show(NoticeKind::Success, "Project added").unwrap();
        assert_eq!(delay, Duration::from_secs(3));
        assert!(model.current().is_some());

        assert!(model.expire(id));
        assert!(model.current().is_none());
    }

    #[test]
    fn test_error_never_auto_clears() {
        let mut model = NoticeModel::default();
        assert!(model.show(NoticeKind::Error, "Delete failed").is_none());
        assert_eq!(model.current().unwrap().kind, NoticeKind::Error);

        model.dismiss();
        assert!(model.current().is_none());
    }

    #[test]
    fn test_stale_timer_does_not_clear_newer_notice() {
        let mut model = NoticeModel::default();
        let (first, _) = model.show(NoticeKind::Success, "Saved").unwrap();
        model.show(NoticeKind::Error, "Rename failed");

        assert!(!model.expire(first));
        assert_eq!(model.current().unwrap().text, "Rename failed");
    }

    #[test]
    fn test_mutation_notice_uses_detail_or_display() {
        let ok: Result<(), ApiError> = Ok(());
        assert_eq!(
            mutation_notice(&ok, "Saved", "Save failed"),
            (NoticeKind::Success, "Saved".to_string())
        );

        let timeout: Result<(), ApiError> =
            Err(ApiError::Transport(crate::web::HttpError::Timeout));
        assert_eq!(
            mutation_notice(&timeout, "Saved", "Save failed"),
            (NoticeKind::Error, "Save failed: request timed out".to_string())
        );
    }

    #[test]
    fn test_newer_success_restarts_its_own_timer() {
        let mut model = NoticeModel::default();
        let (first, _) = model.show(NoticeKind::Success, "Saved").unwrap();
        let (second, _) = model.show(NoticeKind::Success, "Saved again").unwrap();
        assert_ne!(first, second);
        assert!(!model.expire(first));
        assert!(model.expire(second));
    }
}
