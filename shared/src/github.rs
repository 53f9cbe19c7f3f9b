//! GitHub 仓库 URL 解析
//!
//! 只做展示和表单校验用途，无法识别的 URL 返回 `None` 而不是错误。

use regex::Regex;
use std::sync::LazyLock;

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[/@.])github\.com[/:]([^/\s?#]+)/([^/\s?#]+)").expect("static regex")
});

static URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://(?:www\.)?github\.com/|git@github\.com:)").expect("static regex")
});

/// Extracts `owner/repo` from a GitHub repository URL.
///
/// A trailing `.git`, trailing slashes, query strings and fragments are ignored.
pub fn repo_slug(url: &str) -> Option<String> {
    let caps = REPO_PATTERN.captures(url.trim())?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}

/// Whether the input looks like something the backend can clone.
pub fn is_repository_url(url: &str) -> bool {
    let url = url.trim();
    URL_PREFIX.is_match(url) && repo_slug(url).is_some()
}
