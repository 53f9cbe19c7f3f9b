use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::{LogOut, Sparkles, User};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 导航项：当前路由高亮
#[component]
fn NavLink(route: AppRoute, children: Children) -> impl IntoView {
    let router = use_router();
    let path = route.to_path();
    let target = path.clone();
    let class = move || {
        if router.current_route().with(|current| *current == route) {
            "btn btn-ghost btn-sm gap-2 btn-active"
        } else {
            "btn btn-ghost btn-sm gap-2"
        }
    };

    view! {
        <a
            href=path
            class=class
            on:click=move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                router.navigate(&target);
            }
        >
            {children()}
        </a>
    }
}

/// 顶部导航栏；登录状态下显示面板入口与注销按钮
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let signed_in = auth.is_authenticated_signal();

    let on_logout = move |_| {
        // 导航由路由服务的认证监听处理
        auth.sign_out();
    };

    view! {
        <div class="navbar bg-base-100 shadow-sm px-4">
            <div class="flex-1 gap-2">
                <Link to="/" class="btn btn-ghost text-xl gap-2">
                    <Sparkles attr:class="h-6 w-6 text-primary" />
                    "CodeSage"
                </Link>
                <div class="hidden md:flex gap-1">
                    <NavLink route=AppRoute::Features>"Features"</NavLink>
                    <NavLink route=AppRoute::Pricing>"Pricing"</NavLink>
                </div>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || signed_in.get()
                    fallback=|| view! {
                        <Link to="/login" class="btn btn-ghost btn-sm">"Log in"</Link>
                        <Link to="/signup" class="btn btn-primary btn-sm">"Get started"</Link>
                    }
                >
                    <NavLink route=AppRoute::Dashboard>"Dashboard"</NavLink>
                    <NavLink route=AppRoute::Profile>
                        <User attr:class="h-4 w-4" />
                        {move || auth.session().map(|s| s.label().to_string()).unwrap_or_default()}
                    </NavLink>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" /> "Log out"
                    </button>
                </Show>
            </div>
        </div>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center p-6 text-base-content/50 text-sm">
            <p>"CodeSage · AI-assisted code analysis for your GitHub repositories"</p>
        </footer>
    }
}

/// 页面框架：导航栏 + 内容 + 页脚
#[component]
pub fn PageShell(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col bg-base-200 font-sans">
            <Navbar />
            <main class="flex-1 w-full max-w-7xl mx-auto p-4 md:p-8">{children()}</main>
            <Footer />
        </div>
    }
}
