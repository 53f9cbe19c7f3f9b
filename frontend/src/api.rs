//! CodeSage REST 客户端
//!
//! 每个端点由 `codesage_shared::ApiRequest` 描述，这里只负责拼装请求、
//! 附加 Bearer 令牌、解析并校验响应。

use std::time::Duration;

use codesage_shared::{
    AnalysisReport, ApiRequest, CreateProjectRequest, CreateProjectResponse,
    DeleteProjectRequest, GetAnalysisRequest, GetProfileRequest, HEADER_AUTHORIZATION,
    ListProjectsRequest, Profile, Project, ReviewCodeRequest, SaveProfileRequest,
    UpdateProjectRequest,
};
use serde::Deserialize;
use thiserror::Error;

use crate::identity::AuthError;
use crate::web::{FetchHttpClient, HttpClient, HttpError, HttpRequest};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 后端返回非 2xx
    #[error("{}", http_error_text(.status, .detail))]
    Http { status: u16, detail: Option<String> },
    #[error(transparent)]
    Transport(#[from] HttpError),
    /// 响应结构不符合约定
    #[error("unexpected response from server: {0}")]
    Decode(String),
    #[error("request could not be encoded: {0}")]
    Encode(String),
    #[error("you are not signed in")]
    NoSession,
    #[error(transparent)]
    Session(#[from] AuthError),
}

fn http_error_text(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("{} (HTTP {})", detail, status),
        None => format!("request failed with HTTP {}", status),
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 后端提供的错误详情（FastAPI 的 `detail` 字段）
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// FastAPI 错误体 `{"detail": "..."}`；校验错误时 detail 是数组
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .next()
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct CodeSageApi<C = FetchHttpClient> {
    base_url: String,
    timeout: Duration,
    client: C,
}

impl CodeSageApi<FetchHttpClient> {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(config.api_base.clone(), config.request_timeout, FetchHttpClient)
    }
}

impl<C: HttpClient> CodeSageApi<C> {
    pub fn new(base_url: impl Into<String>, timeout: Duration, client: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个端点请求
    pub async fn send<R: ApiRequest>(&self, token: &str, req: &R) -> Result<R::Response, ApiError> {
        let mut http = HttpRequest::new(self.url(&req.path()), R::METHOD)
            .with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token))
            .with_header("Accept", "application/json")
            .with_timeout(self.timeout);
        if R::METHOD.has_body() {
            let body = serde_json::to_string(req).map_err(|e| ApiError::Encode(e.to_string()))?;
            http = http.with_json_body(body);
        }

        log::debug!("[api] {} {}", R::METHOD.as_str(), http.url);
        let res = self.client.send(http).await?;

        if !res.ok() {
            log::warn!("[api] {} {} -> {}", R::METHOD.as_str(), req.path(), res.status);
            return Err(ApiError::Http {
                status: res.status,
                detail: error_detail(&res.body),
            });
        }

        // 204 等空响应体按 JSON null 解析（对应 `()`）
        let body = if res.body.trim().is_empty() {
            "null"
        } else {
            res.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 获取项目列表
    pub async fn list_projects(&self, token: &str) -> Result<Vec<Project>, ApiError> {
        self.send(token, &ListProjectsRequest).await
    }

    /// 注册仓库
    pub async fn create_project(
        &self,
        token: &str,
        github_url: &str,
    ) -> Result<CreateProjectResponse, ApiError> {
        let req = CreateProjectRequest {
            github_url: github_url.trim().to_string(),
        };
        self.send(token, &req).await
    }

    /// 重命名项目
    pub async fn rename_project(&self, token: &str, id: &str, name: &str) -> Result<Project, ApiError> {
        let req = UpdateProjectRequest {
            id: id.to_string(),
            name: name.trim().to_string(),
        };
        self.send(token, &req).await
    }

    /// 删除项目
    pub async fn delete_project(&self, token: &str, id: &str) -> Result<(), ApiError> {
        self.send(token, &DeleteProjectRequest { id: id.to_string() })
            .await
    }

    pub async fn get_analysis(&self, token: &str, project_id: &str) -> Result<AnalysisReport, ApiError> {
        let req = GetAnalysisRequest {
            project_id: project_id.to_string(),
        };
        self.send(token, &req).await
    }

    pub async fn get_profile(&self, token: &str) -> Result<Profile, ApiError> {
        self.send(token, &GetProfileRequest).await
    }

    /// 读取资料；尚未创建资料（404）时返回空资料
    pub async fn load_profile(&self, token: &str) -> Result<Profile, ApiError> {
        match self.get_profile(token).await {
            Err(ApiError::Http { status: 404, .. }) => Ok(Profile::default()),
            other => other,
        }
    }

    pub async fn save_profile(&self, token: &str, profile: Profile) -> Result<Profile, ApiError> {
        self.send(token, &SaveProfileRequest { profile }).await
    }

    /// 请求 AI 代码审查，返回 markdown 文本
    pub async fn review_code(
        &self,
        token: &str,
        code_snippet: &str,
        language: &str,
    ) -> Result<String, ApiError> {
        let req = ReviewCodeRequest {
            code_snippet: code_snippet.to_string(),
            language: language.to_string(),
        };
        Ok(self.send(token, &req).await?.review)
    }
}

#[cfg(test)]
impl CodeSageApi<crate::web::mock::MockHttpClient> {
    pub fn mock(&self, method: codesage_shared::HttpMethod, url: &str, status: u16, body: &str) {
        self.client.mock_response(method, url, status, body);
    }

    pub fn client_requests(&self) -> usize {
        self.client.request_count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.client.last_request()
    }
}
