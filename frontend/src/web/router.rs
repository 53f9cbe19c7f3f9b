//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程，
//! 守卫决策本身由 `RouteGuard` 给出。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardDecision, RouteGuard};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
}

fn write_history(path: &str, mode: HistoryMode) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = match mode {
        HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
    };
    if result.is_err() {
        log::warn!("[router] history update failed for {}", path);
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证检查信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 认证状态检查（注入的信号，实现解耦）
    is_authenticated: Signal<bool>,
    guard: StoredValue<RouteGuard>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        let (current_route, set_route) = signal(AppRoute::from_path(&current_path()));
        let router = Self {
            current_route,
            set_route,
            is_authenticated,
            guard: StoredValue::new(RouteGuard::default()),
        };

        // 初始 URL 同样经过守卫
        let initial = current_route.get_untracked();
        router.apply(initial, HistoryMode::Replace);
        router
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.navigate_to(AppRoute::from_path(path));
    }

    pub fn navigate_to(&self, route: AppRoute) {
        self.apply(route, HistoryMode::Push);
    }

    fn decide(&self, target: AppRoute) -> GuardDecision {
        let has_session = self.is_authenticated.get_untracked();
        self.guard.with_value(|guard| guard.resolve(target, has_session))
    }

    /// 执行守卫决策并更新 History 与当前路由
    fn apply(&self, target: AppRoute, mode: HistoryMode) {
        match self.decide(target.clone()) {
            GuardDecision::Render(route) => {
                if mode == HistoryMode::Push || route.to_path() != current_path() {
                    write_history(&route.to_path(), mode);
                }
                self.set_route.set(route);
            }
            GuardDecision::Redirect(route) => {
                log::info!("[router] {} is guarded, redirecting to {}", target, route);
                // 重定向不留下被拒绝的页面记录
                write_history(&route.to_path(), HistoryMode::Replace);
                self.set_route.set(route);
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            router.apply(target, HistoryMode::Replace);
        });

        if let Some(window) = web_sys::window() {
            if window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("[router] popstate listener could not be installed");
            }
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let router = *self;
        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let route = router.current_route.get_untracked();
            if let GuardDecision::Redirect(target) = router.decide(route) {
                log::info!(
                    "[router] auth state changed ({}), redirecting to {}",
                    if is_auth { "signed in" } else { "signed out" },
                    target
                );
                write_history(&target.to_path(), HistoryMode::Push);
                router.set_route.set(target);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接：拦截点击改为客户端导航
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        // 保留修饰键打开新标签页的行为
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() || ev.button() != 0 {
            return;
        }
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
