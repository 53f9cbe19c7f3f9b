//! 认证模块
//!
//! 管理用户会话，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态。
//!
//! 启动时先从 LocalStorage 恢复会话，恢复完成（有或没有会话）之后
//! 上下文才进入 ready 状态，在此之前应用不渲染任何页面。

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;
use thiserror::Error;

use crate::api::{ApiError, CodeSageApi};
use crate::config;
use crate::identity::store::{BrowserSessionStore, SessionStore, persist};
use crate::identity::{AuthError, IdentityClient, Session, now_millis};
use crate::validation::{self, FieldErrors};
use crate::web::HttpClient;

// =========================================================
// 状态模型
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthPhase {
    /// 尚未收到第一次会话通知
    #[default]
    Initializing,
    Ready(Option<Session>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthModel {
    phase: AuthPhase,
}

impl AuthModel {
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, AuthPhase::Ready(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            AuthPhase::Ready(session) => session.as_ref(),
            AuthPhase::Initializing => None,
        }
    }

    /// 接收会话变更；返回是否为第一次通知（即刚进入 ready）
    pub fn notify(&mut self, session: Option<Session>) -> bool {
        let first = !self.is_ready();
        self.phase = AuthPhase::Ready(session);
        first
    }

    /// 令牌刷新后替换会话；期间用户已登出或切换时忽略
    pub fn renew(&mut self, renewed: Session) -> bool {
        match &mut self.phase {
            AuthPhase::Ready(Some(current)) if current.uid == renewed.uid => {
                *current = renewed;
                true
            }
            _ => false,
        }
    }

    /// 写回令牌获取结果：刷新成功则更新会话，被拒绝则登出
    pub fn settle_token(&mut self, outcome: TokenOutcome) -> Result<String, ApiError> {
        match outcome {
            TokenOutcome::Current(token) => Ok(token),
            TokenOutcome::Renewed(token, renewed) => {
                self.renew(renewed);
                Ok(token)
            }
            TokenOutcome::Rejected(e) => {
                self.notify(None);
                Err(ApiError::Session(e))
            }
            TokenOutcome::Failed(e) => Err(ApiError::Session(e)),
        }
    }
}

// =========================================================
// 令牌获取
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TokenOutcome {
    /// 现有令牌仍然有效
    Current(String),
    Renewed(String, Session),
    /// 身份提供方拒绝刷新，会话失效
    Rejected(AuthError),
    /// 暂时性失败（网络等），会话保留
    Failed(AuthError),
}

impl TokenOutcome {
    /// 会话是否因此改变，需要重新持久化
    pub fn changes_session(&self) -> bool {
        matches!(self, TokenOutcome::Renewed(..) | TokenOutcome::Rejected(_))
    }
}

/// 为会话取得可用的 id token，临近过期时先刷新
pub async fn obtain_token<C: HttpClient>(
    identity: &IdentityClient<C>,
    session: &Session,
    now: i64,
) -> TokenOutcome {
    match identity.fresh_token(session, now).await {
        Ok((token, None)) => TokenOutcome::Current(token),
        Ok((token, Some(renewed))) => TokenOutcome::Renewed(token, renewed),
        Err(e @ AuthError::Provider { .. }) => {
            log::warn!("[auth] token refresh rejected: {}", e);
            TokenOutcome::Rejected(e)
        }
        Err(e) => TokenOutcome::Failed(e),
    }
}

// =========================================================
// 表单提交
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("Please correct the highlighted fields.")]
    Invalid(FieldErrors),
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
}

#[cfg(test)]
impl SubmitError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitError::Invalid(errors) => Some(errors),
            SubmitError::Auth(_) => None,
        }
    }
}

/// 邮箱密码登录；校验不通过时不发出任何请求
pub async fn submit_login<C: HttpClient>(
    identity: &IdentityClient<C>,
    email: &str,
    password: &str,
    now: i64,
) -> Result<Session, SubmitError> {
    validation::validate_login(email, password).map_err(SubmitError::Invalid)?;
    Ok(identity.sign_in(email, password, now).await?)
}

// =========================================================
// 认证上下文
// =========================================================

/// 认证上下文
///
/// 通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: RwSignal<AuthModel>,
    /// 当前用户 uid；令牌刷新不会改变它，适合作为数据加载的依赖
    user_id: Memo<Option<String>>,
}

impl AuthContext {
    pub fn new() -> Self {
        let state = RwSignal::new(AuthModel::default());
        let user_id = Memo::new(move |_| state.with(|s| s.session().map(|s| s.uid.clone())));
        Self { state, user_id }
    }

    pub fn is_ready(&self) -> bool {
        self.state.with(|s| s.is_ready())
    }

    pub fn session(&self) -> Option<Session> {
        self.state.with(|s| s.session().cloned())
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id.get()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let user_id = self.user_id;
        Signal::derive(move || user_id.with(|uid| uid.is_some()))
    }

    fn notify(&self, session: Option<Session>) {
        persist(&BrowserSessionStore, session.as_ref());
        if self.state.try_update(|s| s.notify(session)) == Some(true) {
            log::info!("[auth] ready");
        }
    }

    pub fn sign_in(&self, session: Session) {
        log::info!("[auth] signed in as {}", session.uid);
        self.notify(Some(session));
    }

    /// 注销
    ///
    /// 导航将由路由服务的认证状态监听自动处理。
    pub fn sign_out(&self) {
        log::info!("[auth] signed out");
        self.notify(None);
    }

    /// 返回当前可用的 id token，临近过期时先刷新。
    ///
    /// 身份提供方拒绝刷新时会话失效，用户被登出。
    pub async fn bearer_token(&self) -> Result<String, ApiError> {
        let session = self
            .state
            .with_untracked(|s| s.session().cloned())
            .ok_or(ApiError::NoSession)?;

        let identity = IdentityClient::from_config(config::get());
        let outcome = obtain_token(&identity, &session, now_millis()).await;
        let changed = outcome.changes_session();
        let result = self
            .state
            .try_update(|s| s.settle_token(outcome))
            .unwrap_or(Err(ApiError::NoSession));
        if changed {
            persist(&BrowserSessionStore, self.session().as_ref());
        }
        result
    }

    /// 取得令牌后调用后端
    pub async fn with_api<T, F, Fut>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(CodeSageApi, String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self.bearer_token().await?;
        call(CodeSageApi::from_config(config::get()), token).await
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 恢复持久化的会话（过期时刷新），完成后发出第一次通知。
pub fn init_auth(ctx: AuthContext) {
    spawn_local(async move {
        let identity = IdentityClient::from_config(config::get());
        let stored = BrowserSessionStore.load();
        let had_session = stored.is_some();
        let session = identity.restore(stored, now_millis()).await;
        if had_session && session.is_none() {
            log::info!("[auth] stored session discarded");
        }
        ctx.notify(session);
    });
}
