use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod date;
pub mod github;
pub mod protocol;

pub use protocol::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BIO_MAX_CHARS: usize = 500;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// Pipeline state of a registered repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Created,
    Analyzing,
    Completed,
    Error,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Created,
        ProjectStatus::Analyzing,
        ProjectStatus::Completed,
        ProjectStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Created => "created",
            ProjectStatus::Analyzing => "analyzing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Created => "Created",
            ProjectStatus::Analyzing => "Analyzing",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Error => "Error",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub github_url: String,
    pub status: ProjectStatus,
    /// ISO-8601 as produced by the backend, offset optional.
    pub created_at: String,
}

impl Project {
    /// `owner/repo` for display, `None` when the URL is not a GitHub repository.
    pub fn repo_slug(&self) -> Option<String> {
        github::repo_slug(&self.github_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub bio: String,
}

// =========================================================
// 分析结果 (Analysis Report)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    Function,
    Class,
    Variable,
}

impl ConstructKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConstructKind::Function => "function",
            ConstructKind::Class => "class",
            ConstructKind::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construct {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConstructKind,
    pub line: i64,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub code_snippet: Option<String>,
}

impl Construct {
    /// The analyzer reports `-1` when it could not locate the construct.
    pub fn line_number(&self) -> Option<u32> {
        u32::try_from(self.line).ok().filter(|line| *line > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_path: String,
    pub language: String,
    pub constructs: Vec<Construct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_files: u32,
    pub parsed_files: u32,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stats: AnalysisStats,
    pub files: Vec<FileAnalysis>,
    #[serde(default)]
    pub readme_content: Option<String>,
    #[serde(default)]
    pub class_summaries: Option<BTreeMap<String, String>>,
}

impl AnalysisReport {
    pub fn construct_count(&self) -> usize {
        self.files.iter().map(|f| f.constructs.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub review: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "stats": {"total_files": 3, "parsed_files": 2, "languages": ["python", "javascript"]},
        "files": [
            {"file_path": "app.py", "language": "python", "constructs": [
                {"name": "main", "type": "function", "line": 4, "documentation": "Entry point."},
                {"name": "Config", "type": "class", "line": 12}
            ]},
            {"file_path": "index.js", "language": "javascript", "constructs": [
                {"name": "render", "type": "function", "line": -1, "code_snippet": "function render() {}"}
            ]}
        ],
        "class_summaries": {"Config": "Holds settings."}
    }"#;

    #[test]
    fn test_report_decodes_optional_fields() {
        let report: AnalysisReport = serde_json::from_str(REPORT).unwrap();
        assert_eq!(report.stats.total_files, 3);
        assert_eq!(report.construct_count(), 3);
        assert!(report.readme_content.is_none());
        assert_eq!(
            report.class_summaries.unwrap().get("Config").map(String::as_str),
            Some("Holds settings.")
        );
        assert_eq!(report.files[0].constructs[1].kind, ConstructKind::Class);
    }

    #[test]
    fn test_report_without_files_is_rejected() {
        let body = r#"{"stats": {"total_files": 0, "parsed_files": 0, "languages": []}}"#;
        assert!(serde_json::from_str::<AnalysisReport>(body).is_err());
    }

    #[test]
    fn test_unknown_project_status_is_rejected() {
        let body = r#"{"id":"p1","name":"widget","github_url":"https://github.com/acme/widget",
            "status":"paused","created_at":"2026-10-14T09:00:00"}"#;
        assert!(serde_json::from_str::<Project>(body).is_err());
    }

    #[test]
    fn test_project_ignores_backend_only_fields() {
        let body = r#"{"id":"p1","name":"widget","github_url":"https://github.com/acme/widget",
            "status":"analyzing","created_at":"2026-10-14T09:00:00","owner_uid":"u1","settings":{}}"#;
        let project: Project = serde_json::from_str(body).unwrap();
        assert_eq!(project.status, ProjectStatus::Analyzing);
        assert_eq!(project.repo_slug().as_deref(), Some("acme/widget"));
    }

    #[test]
    fn test_unknown_line_is_hidden() {
        let construct = Construct {
            name: "render".into(),
            kind: ConstructKind::Function,
            line: -1,
            documentation: None,
            code_snippet: None,
        };
        assert_eq!(construct.line_number(), None);
        assert_eq!(Construct { line: 7, ..construct }.line_number(), Some(7));
    }

    #[test]
    fn test_profile_uses_camel_case() {
        let profile = Profile {
            display_name: "Ada".into(),
            bio: "Engineer".into(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"displayName":"Ada","bio":"Engineer"}"#);
    }

    #[test]
    fn test_status_round_trips_through_parse() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("archived"), None);
    }
}
