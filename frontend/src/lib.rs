//! CodeSage 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫决策（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth` / `identity`: 会话生命周期与身份服务客户端
//! - `api`: CodeSage 后端 REST 客户端
//! - `resource` / `filter` / `notice`: 页面共用的状态模型
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod expand;
mod filter;
mod identity;
pub mod logging;
mod notice;
mod resource;
mod signup;
mod validation;
mod components {
    mod add_project_dialog;
    pub mod dashboard;
    mod feedback;
    mod icons;
    mod layout;
    pub mod login;
    pub mod marketing;
    pub mod not_found;
    pub mod profile;
    pub mod project_analysis;
    pub mod signup;
}

use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::marketing::{FeaturesPage, HomePage, PricingPage};
use crate::components::not_found::NotFoundPage;
use crate::components::profile::ProfilePage;
use crate::components::project_analysis::ProjectPage;
use crate::components::signup::SignupPage;

use leptos::prelude::*;

pub use config::get as app_config;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    #[cfg(test)]
    pub use http::mock;
    pub use http::{FetchHttpClient, HttpClient, HttpError, HttpRequest};
    pub use storage::LocalStorage;
    pub use timer::Timeout;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Features => view! { <FeaturesPage /> }.into_any(),
        AppRoute::Pricing => view! { <PricingPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Signup => view! { <SignupPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::Project(id) => view! { <ProjectPage project_id=id /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 从持久化会话恢复登录状态
    init_auth(auth_ctx);

    // 3. 获取认证状态信号，用于注入路由服务（解耦！）
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        // 4. 会话恢复完成前不渲染任何内容，也不做守卫判断
        <Show when=move || auth_ctx.is_ready()>
            <Router is_authenticated=is_authenticated>
                <RouterOutlet matcher=route_matcher />
            </Router>
        </Show>
    }
}
