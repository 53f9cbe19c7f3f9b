//! 内存列表的搜索与分类过滤
//!
//! 所有函数都是纯函数：只依赖当前列表和当前过滤条件。

use codesage_shared::{FileAnalysis, Project, ProjectStatus};

/// 列表为空与过滤无结果需要不同的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoData,
    NoMatches,
    Populated,
}

impl EmptyState {
    pub fn of(total: usize, matched: usize) -> Self {
        match (total, matched) {
            (0, _) => Self::NoData,
            (_, 0) => Self::NoMatches,
            _ => Self::Populated,
        }
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn fold_search(search: &str) -> String {
    search.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    fn matches_folded(&self, project: &Project, needle: &str) -> bool {
        let text_match = needle.is_empty()
            || contains_folded(&project.name, needle)
            || contains_folded(&project.github_url, needle);
        let status_match = self.status.is_none_or(|s| s == project.status);
        text_match && status_match
    }

    pub fn apply(&self, projects: &[Project]) -> Vec<Project> {
        let needle = fold_search(&self.search);
        projects
            .iter()
            .filter(|p| self.matches_folded(p, &needle))
            .cloned()
            .collect()
    }
}

/// 各状态的项目数量（基于未过滤列表）
pub fn status_counts(projects: &[Project]) -> Vec<(ProjectStatus, usize)> {
    ProjectStatus::ALL
        .into_iter()
        .map(|status| (status, projects.iter().filter(|p| p.status == status).count()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFilter {
    pub search: String,
    pub language: Option<String>,
}

impl FileFilter {
    fn matches_folded(&self, file: &FileAnalysis, needle: &str) -> bool {
        let text_match = needle.is_empty()
            || contains_folded(&file.file_path, needle)
            || file.constructs.iter().any(|c| contains_folded(&c.name, needle));
        let language_match = self
            .language
            .as_deref()
            .is_none_or(|lang| lang.eq_ignore_ascii_case(&file.language));
        text_match && language_match
    }

    pub fn apply(&self, files: &[FileAnalysis]) -> Vec<FileAnalysis> {
        let needle = fold_search(&self.search);
        files
            .iter()
            .filter(|f| self.matches_folded(f, &needle))
            .cloned()
            .collect()
    }
}
