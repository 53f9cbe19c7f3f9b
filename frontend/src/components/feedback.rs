//! 加载、错误、提示等通用反馈组件

use leptos::prelude::*;

use crate::components::icons::{AlertTriangle, ArrowLeft, Check, RefreshCw, X};
use crate::notice::{NoticeKind, Notices};
use crate::resource::FetchError;
use crate::validation::{Field, FieldErrors};
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn LoadingBlock(#[prop(into)] label: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center gap-3 py-16 text-base-content/60">
            <span class="loading loading-spinner loading-md"></span>
            <span>{label}</span>
        </div>
    }
}

/// 表单字段下方的校验错误
#[component]
pub fn FieldError(#[prop(into)] errors: Signal<FieldErrors>, field: Field) -> impl IntoView {
    move || {
        errors.with(|e| e.get(field)).map(|message| {
            view! {
                <label class="label">
                    <span class="label-text-alt text-error">{message}</span>
                </label>
            }
        })
    }
}

/// 页面内的提示条：成功 3 秒后消失，错误需手动关闭
#[component]
pub fn NoticeBanner(notices: Notices) -> impl IntoView {
    move || {
        notices.current().map(|notice| {
            let (class, icon) = match notice.kind {
                NoticeKind::Success => ("alert alert-success shadow", view! { <Check attr:class="h-5 w-5" /> }.into_any()),
                NoticeKind::Error => ("alert alert-error shadow", view! { <AlertTriangle attr:class="h-5 w-5" /> }.into_any()),
            };
            view! {
                <div role="alert" class=class>
                    {icon}
                    <span class="flex-1">{notice.text}</span>
                    <button
                        class="btn btn-ghost btn-xs btn-square"
                        aria-label="Dismiss"
                        on:click=move |_| notices.dismiss()
                    >
                        <X attr:class="h-4 w-4" />
                    </button>
                </div>
            }
        })
    }
}

/// 加载失败面板
///
/// 总是提供重试；`show_back` 为真时额外提供返回面板的链接。
#[component]
pub fn FetchErrorPanel(
    error: FetchError,
    #[prop(into)] on_retry: Callback<()>,
    #[prop(optional)] show_back: bool,
) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body items-center text-center gap-3">
                <AlertTriangle attr:class="h-10 w-10 text-error" />
                <h2 class="card-title">{error.kind.title()}</h2>
                <p class="text-base-content/70 max-w-md">{error.message}</p>
                <div class="card-actions mt-2">
                    <button class="btn btn-primary gap-2" on:click=move |_| on_retry.run(())>
                        <RefreshCw attr:class="h-4 w-4" /> "Retry"
                    </button>
                    <Show when=move || show_back>
                        <Link to=AppRoute::Dashboard.to_path() class="btn btn-ghost gap-2">
                            <ArrowLeft attr:class="h-4 w-4" /> "Back to dashboard"
                        </Link>
                    </Show>
                </div>
            </div>
        </div>
    }
}
