//! 身份提供方客户端
//!
//! 通过 Identity Toolkit 兼容的 REST 接口完成邮箱密码登录、注册和令牌刷新。
//! 会话对象保存短期 id token 与 refresh token，令牌在临近过期时刷新。

use std::time::Duration;

use codesage_shared::HttpMethod;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdentityConfig;
use crate::web::{FetchHttpClient, HttpClient, HttpError, HttpRequest};

pub mod store;

/// id token 剩余有效期低于该值时刷新
pub const REFRESH_MARGIN_MS: i64 = 60_000;

/// 当前时间（Unix 毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// id token 的过期时间（Unix 毫秒）
    pub expires_at: i64,
}

impl Session {
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at - now <= REFRESH_MARGIN_MS
    }

    /// 展示用名称：优先 display name，否则邮箱
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

// =========================================================
// 错误类型
// =========================================================

/// 身份提供方返回的错误码
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailExists,
    WeakPassword,
    InvalidEmail,
    InvalidCredentials,
    UserDisabled,
    TooManyAttempts,
    /// refresh token 失效或用户被删除
    SessionExpired,
    Other(String),
}

impl AuthErrorCode {
    pub fn parse(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN" => {
                Self::SessionExpired
            }
            other => Self::Other(other.to_string()),
        }
    }

    /// 面向用户的提示文案
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmailExists => "An account with this email already exists.",
            Self::WeakPassword => "Password is too weak. Use at least 6 characters.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyAttempts => "Too many attempts. Please try again later.",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::Other(_) => "Authentication failed. Please try again.",
        }
    }

    /// 注册时该错误是否属于第一步（账户凭据）的问题
    pub fn concerns_credentials(&self) -> bool {
        matches!(self, Self::EmailExists | Self::WeakPassword | Self::InvalidEmail)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("{}", .code.user_message())]
    Provider { code: AuthErrorCode, message: String },
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("unexpected response from identity provider: {0}")]
    Decode(String),
    #[error("identity request could not be encoded: {0}")]
    Encode(String),
}

impl AuthError {
    pub fn code(&self) -> Option<&AuthErrorCode> {
        match self {
            AuthError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }

    /// 用户可见文案
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Provider { code, .. } => code.user_message().to_string(),
            AuthError::Transport(_) => {
                "Could not reach the sign-in service. Check your connection.".to_string()
            }
            AuthError::Decode(_) | AuthError::Encode(_) => {
                "Sign-in service returned an unexpected response.".to_string()
            }
        }
    }
}

// =========================================================
// 协议
// =========================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn expires_at(now: i64, expires_in: &str) -> Result<i64, AuthError> {
    let secs: i64 = expires_in
        .trim()
        .parse()
        .map_err(|_| AuthError::Decode(format!("bad expiresIn `{}`", expires_in)))?;
    Ok(now + secs * 1000)
}

// =========================================================
// 客户端
// =========================================================

#[derive(Debug, Clone)]
pub struct IdentityClient<C = FetchHttpClient> {
    config: IdentityConfig,
    timeout: Duration,
    client: C,
}

impl IdentityClient<FetchHttpClient> {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(config.identity.clone(), config.request_timeout, FetchHttpClient)
    }
}

impl<C: HttpClient> IdentityClient<C> {
    pub fn new(config: IdentityConfig, timeout: Duration, client: C) -> Self {
        Self {
            config,
            timeout,
            client,
        }
    }

    fn accounts_url(&self, action: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.auth_origin, action, self.config.api_key
        )
    }

    fn token_url(&self) -> String {
        format!("{}/v1/token?key={}", self.config.token_origin, self.config.api_key)
    }

    async fn post<T: Serialize>(&self, url: String, body: &T) -> Result<String, AuthError> {
        let body = serde_json::to_string(body).map_err(|e| AuthError::Encode(e.to_string()))?;
        let req = HttpRequest::new(url, HttpMethod::Post)
            .with_json_body(body)
            .with_timeout(self.timeout);
        let res = self.client.send(req).await?;
        if res.ok() {
            return Ok(res.body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&res.body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", res.status));
        log::info!("[identity] provider rejected request: {}", message);
        Err(AuthError::Provider {
            code: AuthErrorCode::parse(&message),
            message,
        })
    }

    async fn password_flow(
        &self,
        action: &str,
        email: &str,
        password: &str,
        now: i64,
    ) -> Result<Session, AuthError> {
        let req = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let body = self.post(self.accounts_url(action), &req).await?;
        let res: PasswordResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(Session {
            uid: res.local_id,
            email: res.email,
            display_name: res.display_name.filter(|n| !n.is_empty()),
            expires_at: expires_at(now, &res.expires_in)?,
            id_token: res.id_token,
            refresh_token: res.refresh_token,
        })
    }

    /// 邮箱密码登录
    pub async fn sign_in(&self, email: &str, password: &str, now: i64) -> Result<Session, AuthError> {
        self.password_flow("signInWithPassword", email, password, now)
            .await
    }

    /// 创建账户（成功后即处于登录状态）
    pub async fn sign_up(&self, email: &str, password: &str, now: i64) -> Result<Session, AuthError> {
        self.password_flow("signUp", email, password, now).await
    }

    /// 使用 refresh token 换取新的 id token
    pub async fn refresh(&self, session: &Session, now: i64) -> Result<Session, AuthError> {
        let req = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: &session.refresh_token,
        };
        let body = self.post(self.token_url(), &req).await?;
        let res: RefreshResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        if res.user_id != session.uid {
            return Err(AuthError::Decode("refreshed token belongs to another user".to_string()));
        }
        Ok(Session {
            expires_at: expires_at(now, &res.expires_in)?,
            id_token: res.id_token,
            refresh_token: res.refresh_token,
            ..session.clone()
        })
    }

    /// 返回可用的 id token；需要刷新时一并返回新会话
    pub async fn fresh_token(
        &self,
        session: &Session,
        now: i64,
    ) -> Result<(String, Option<Session>), AuthError> {
        if !session.needs_refresh(now) {
            return Ok((session.id_token.clone(), None));
        }
        log::debug!("[identity] refreshing id token for {}", session.uid);
        let renewed = self.refresh(session, now).await?;
        Ok((renewed.id_token.clone(), Some(renewed)))
    }

    /// 恢复持久化的会话；过期则刷新，刷新被拒绝时丢弃。
    ///
    /// 网络错误时同样丢弃，用户需要重新登录。
    pub async fn restore(&self, stored: Option<Session>, now: i64) -> Option<Session> {
        let session = stored?;
        if !session.needs_refresh(now) {
            return Some(session);
        }
        match self.refresh(&session, now).await {
            Ok(renewed) => Some(renewed),
            Err(e) => {
                log::warn!("[identity] stored session could not be renewed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
impl IdentityClient<crate::web::mock::MockHttpClient> {
    pub fn mock(&self, method: codesage_shared::HttpMethod, url: &str, status: u16, body: &str) {
        self.client.mock_response(method, url, status, body);
    }

    pub fn mock_error(&self, method: codesage_shared::HttpMethod, url: &str, error: HttpError) {
        self.client.mock_error(method, url, error);
    }

    pub fn client_requests(&self) -> usize {
        self.client.request_count()
    }
}

#[cfg(test)]
mod tests;
