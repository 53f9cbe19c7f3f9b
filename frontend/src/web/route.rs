//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路由属性以及守卫决策。

use std::fmt::Display;

use codesage_shared::encode_segment;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页 (默认路由)
    #[default]
    Home,
    Features,
    Pricing,
    Login,
    Signup,
    /// 需要认证
    Dashboard,
    /// 需要认证
    Profile,
    /// 单个项目的分析结果 (需要认证)
    Project(String),
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举，忽略查询串、片段和末尾斜杠
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/features" => Self::Features,
            "/pricing" => Self::Pricing,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/dashboard" => Self::Dashboard,
            "/profile" => Self::Profile,
            _ => match trimmed.strip_prefix("/projects/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Self::Project(decode_segment(id))
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Features => "/features".to_string(),
            Self::Pricing => "/pricing".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Project(id) => format!("/projects/{}", encode_segment(id)),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Profile | Self::Project(_))
    }

    /// 已认证用户是否应该离开此路由（登录、注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// 登录成功后的默认落点
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 无法解码（非 UTF-8）时保留原始片段
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// 守卫决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(AppRoute),
    Redirect(AppRoute),
}

/// 路由守卫
///
/// 无状态：只根据目标路由和当前是否存在会话做出决策。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    fallback: AppRoute,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(AppRoute::Login)
    }
}

impl RouteGuard {
    pub fn new(fallback: AppRoute) -> Self {
        Self { fallback }
    }

    pub fn resolve(&self, target: AppRoute, has_session: bool) -> GuardDecision {
        if target.requires_auth() && !has_session {
            return GuardDecision::Redirect(self.fallback.clone());
        }
        if target.should_redirect_when_authenticated() && has_session {
            return GuardDecision::Redirect(AppRoute::auth_success_redirect());
        }
        GuardDecision::Render(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/pricing/"), AppRoute::Pricing);
        assert_eq!(AppRoute::from_path("/dashboard?tab=all"), AppRoute::Dashboard);
        assert_eq!(
            AppRoute::from_path("/projects/abc123"),
            AppRoute::Project("abc123".to_string())
        );
        assert_eq!(AppRoute::from_path("/projects/"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/projects/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/admin"), AppRoute::NotFound);
    }

    #[test]
    fn test_project_path_round_trip() {
        let route = AppRoute::Project("id with space".to_string());
        assert_eq!(route.to_path(), "/projects/id%20with%20space");
        assert_eq!(AppRoute::from_path(&route.to_path()), route);

        let route = AppRoute::Project("projet-é".to_string());
        assert_eq!(route.to_path(), "/projects/projet-%C3%A9");
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn test_invalid_utf8_segment_is_kept_raw() {
        assert_eq!(
            AppRoute::from_path("/projects/%FF"),
            AppRoute::Project("%FF".to_string())
        );
    }

    #[test]
    fn test_protected_route_without_session_redirects_to_login() {
        let guard = RouteGuard::default();
        for route in [
            AppRoute::Dashboard,
            AppRoute::Profile,
            AppRoute::Project("p1".to_string()),
        ] {
            assert_eq!(
                guard.resolve(route, false),
                GuardDecision::Redirect(AppRoute::Login)
            );
        }
    }

    #[test]
    fn test_protected_route_with_session_renders() {
        let guard = RouteGuard::default();
        let target = AppRoute::Project("p1".to_string());
        assert_eq!(
            guard.resolve(target.clone(), true),
            GuardDecision::Render(target)
        );
    }

    #[test]
    fn test_public_routes_render_for_everyone() {
        let guard = RouteGuard::default();
        for route in [AppRoute::Home, AppRoute::Features, AppRoute::Pricing] {
            assert_eq!(guard.resolve(route.clone(), false), GuardDecision::Render(route.clone()));
            assert_eq!(guard.resolve(route.clone(), true), GuardDecision::Render(route));
        }
    }

    #[test]
    fn test_fallback_is_configurable() {
        let guard = RouteGuard::new(AppRoute::Home);
        assert_eq!(
            guard.resolve(AppRoute::Profile, false),
            GuardDecision::Redirect(AppRoute::Home)
        );
    }

    #[test]
    fn test_signed_in_visitor_skips_login_and_signup() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.resolve(AppRoute::Signup, true),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            guard.resolve(AppRoute::Login, false),
            GuardDecision::Render(AppRoute::Login)
        );
    }
}
