//! 远程资源的加载状态机
//!
//! 每个页面的主资源都遵循 `Idle -> Loading -> Success | Error`。
//! 每次加载领取一张 `FetchTicket`，只有最新的 ticket 能写回结果，
//! 被新请求取代或已中止的请求结果会被丢弃。

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiError;
use crate::web::HttpError;

// =========================================================
// 错误分类
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Server,
    Timeout,
    Other,
}

impl FetchErrorKind {
    pub fn classify(error: &ApiError) -> Self {
        if let Some(status) = error.status() {
            return match status {
                404 => Self::NotFound,
                401 => Self::Unauthorized,
                403 => Self::Forbidden,
                500.. => Self::Server,
                _ => Self::Other,
            };
        }
        match error {
            ApiError::NoSession | ApiError::Session(_) => Self::Unauthorized,
            ApiError::Transport(HttpError::Timeout) => Self::Timeout,
            _ => Self::Other,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::Unauthorized => "Not signed in",
            Self::Forbidden => "Access denied",
            Self::Server => "Server error",
            Self::Timeout => "Request timed out",
            Self::Other => "Something went wrong",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "We couldn't find what you were looking for. It may have been deleted.",
            Self::Unauthorized => "Your session is no longer valid. Please sign in again.",
            Self::Forbidden => "You don't have permission to view this.",
            Self::Server => "The server ran into a problem. Please try again in a moment.",
            Self::Timeout => "The server took too long to respond. Check your connection and retry.",
            Self::Other => "The request could not be completed.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl From<&ApiError> for FetchError {
    fn from(error: &ApiError) -> Self {
        let kind = FetchErrorKind::classify(error);
        let message = match (kind, error) {
            (FetchErrorKind::Other, ApiError::Decode(_)) => {
                "The server sent a response in an unexpected format.".to_string()
            }
            (FetchErrorKind::Other, ApiError::Transport(HttpError::NetworkError(_))) => {
                "Could not reach the server. Check your connection.".to_string()
            }
            _ => kind.message().to_string(),
        };
        Self { kind, message }
    }
}

// =========================================================
// 状态机
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Success(T),
    Error(FetchError),
}

impl<T> Phase<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Phase::Success(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceModel<T> {
    phase: Phase<T>,
    generation: u64,
}

impl<T> Default for ResourceModel<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
        }
    }
}

impl<T> ResourceModel<T> {
    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    /// 开始新的加载，之前发出的 ticket 全部失效
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// 写回结果；ticket 已过期时返回 `false` 且不修改状态
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = match result {
            Ok(data) => Phase::Success(data),
            Err(error) => Phase::Error(FetchError::from(&error)),
        };
        true
    }

    /// 中止进行中的加载并回到 `Idle`
    pub fn abort(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
    }
}

// =========================================================
// Leptos 绑定
// =========================================================

/// 绑定到信号的远程资源
pub struct RemoteResource<T: Send + Sync + 'static> {
    state: RwSignal<ResourceModel<T>>,
}

impl<T: Send + Sync + 'static> Clone for RemoteResource<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for RemoteResource<T> {}

impl<T: Clone + Send + Sync + 'static> RemoteResource<T> {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(ResourceModel::default()),
        }
    }

    /// 当前阶段（响应式读取）
    pub fn phase(&self) -> Phase<T> {
        self.state.with(|s| s.phase().clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.phase().is_loading())
    }

    pub fn with_data<U>(&self, f: impl FnOnce(Option<&T>) -> U) -> U {
        self.state.with(|s| f(s.phase().data()))
    }

    /// 发起加载；组件已销毁或被更新的加载取代时结果被丢弃
    pub fn load<Fut>(&self, fetch: Fut)
    where
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let state = self.state;
        let Some(ticket) = state.try_update(|s| s.begin()) else {
            return;
        };
        spawn_local(async move {
            let result = fetch.await;
            let applied = state.try_update(|s| s.resolve(ticket, result));
            if applied != Some(true) {
                log::debug!("[resource] dropped superseded result");
            }
        });
    }

    pub fn abort(&self) {
        self.state.try_update(|s| s.abort());
    }
}

impl<T: Clone + Send + Sync + 'static> Default for RemoteResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error() -> ApiError {
        ApiError::Http {
            status: 503,
            detail: None,
        }
    }

    #[test]
    fn test_success_flow() {
        let mut model = ResourceModel::<Vec<u32>>::default();
        assert_eq!(model.phase(), &Phase::Idle);

        let ticket = model.begin();
        assert!(model.phase().is_loading());
        assert!(model.resolve(ticket, Ok(vec![1, 2])));
        assert_eq!(model.phase().data(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_superseded_fetch_only_keeps_second_outcome() {
        let mut model = ResourceModel::<&str>::default();
        let first = model.begin();
        let second = model.begin();

        // 第二个请求先返回
        assert!(model.resolve(second, Ok("second")));
        assert!(!model.resolve(first, Ok("first")));
        assert_eq!(model.phase(), &Phase::Success("second"));

        // 第一个请求先返回也一样
        let first = model.begin();
        let second = model.begin();
        assert!(!model.resolve(first, Err(server_error())));
        assert!(model.phase().is_loading());
        assert!(model.resolve(second, Ok("latest")));
        assert_eq!(model.phase(), &Phase::Success("latest"));
    }

    #[test]
    fn test_aborted_fetch_is_ignored() {
        let mut model = ResourceModel::<u8>::default();
        let ticket = model.begin();
        model.abort();
        assert!(!model.resolve(ticket, Ok(1)));
        assert_eq!(model.phase(), &Phase::Idle);
    }

    #[test]
    fn test_error_is_classified() {
        let mut model = ResourceModel::<u8>::default();
        let ticket = model.begin();
        model.resolve(ticket, Err(server_error()));
        let Phase::Error(error) = model.phase() else {
            panic!("expected error phase, got {:?}", model.phase());
        };
        assert_eq!(error.kind, FetchErrorKind::Server);
        assert_eq!(error.message, FetchErrorKind::Server.message());
    }

    #[test]
    fn test_classification_table() {
        let http = |status| ApiError::Http {
            status,
            detail: Some("x".to_string()),
        };
        let cases = [
            (http(404), FetchErrorKind::NotFound),
            (http(401), FetchErrorKind::Unauthorized),
            (http(403), FetchErrorKind::Forbidden),
            (http(500), FetchErrorKind::Server),
            (http(502), FetchErrorKind::Server),
            (http(422), FetchErrorKind::Other),
            (ApiError::Transport(HttpError::Timeout), FetchErrorKind::Timeout),
            (
                ApiError::Transport(HttpError::NetworkError("down".into())),
                FetchErrorKind::Other,
            ),
            (ApiError::Decode("missing field".into()), FetchErrorKind::Other),
            (ApiError::NoSession, FetchErrorKind::Unauthorized),
        ];
        for (error, kind) in cases {
            assert_eq!(FetchErrorKind::classify(&error), kind, "{error:?}");
        }
    }

    #[test]
    fn test_every_kind_has_distinct_copy() {
        let kinds = [
            FetchErrorKind::NotFound,
            FetchErrorKind::Unauthorized,
            FetchErrorKind::Forbidden,
            FetchErrorKind::Server,
            FetchErrorKind::Timeout,
            FetchErrorKind::Other,
        ];
        let messages: std::collections::HashSet<_> = kinds.iter().map(|k| k.message()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn test_decode_failure_message() {
        let error = FetchError::from(&ApiError::Decode("missing field `stats`".into()));
        assert_eq!(error.kind, FetchErrorKind::Other);
        assert!(error.message.contains("unexpected format"));
    }
}
