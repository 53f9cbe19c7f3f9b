use leptos::prelude::*;

use crate::auth::{AuthContext, use_auth};
use crate::components::feedback::LoadingBlock;
use crate::components::icons::{AlertTriangle, RefreshCw, Sparkles};
use crate::resource::{Phase, RemoteResource};

/// 待审查的代码片段
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewTarget {
    pub title: String,
    pub code: String,
    pub language: String,
}

fn request_review(auth: AuthContext, review: RemoteResource<String>, target: ReviewTarget) {
    review.load(async move {
        auth.with_api(|api, token| async move {
            api.review_code(&token, &target.code, &target.language).await
        })
        .await
    });
}

/// 代码审查模态框
///
/// `target` 为 `Some` 时打开并请求审查；关闭时置回 `None`，
/// 未完成的请求结果会被丢弃。
#[component]
pub fn CodeReviewModal(target: RwSignal<Option<ReviewTarget>>) -> impl IntoView {
    let auth = use_auth();
    let review = RemoteResource::<String>::new();
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        match target.get() {
            Some(t) => request_review(auth, review, t),
            None => review.abort(),
        }
    });

    Effect::new(move |_| {
        let is_open = target.with(Option::is_some);
        if let Some(dialog) = dialog_ref.get() {
            if is_open {
                if !dialog.open() && dialog.show_modal().is_err() {
                    log::warn!("[analysis] review dialog could not be opened");
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let close = move || {
        if target.with_untracked(Option::is_some) {
            target.set(None);
        }
    };
    let retry = move |_| {
        if let Some(t) = target.get_untracked() {
            request_review(auth, review, t);
        }
    };

    let title = move || target.with(|t| t.as_ref().map(|t| t.title.clone()).unwrap_or_default());

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| close()>
            <div class="modal-box max-w-3xl">
                <h3 class="font-bold text-lg flex items-center gap-2">
                    <Sparkles attr:class="h-5 w-5 text-primary" />
                    "AI review: " {title}
                </h3>
                <div class="py-4 min-h-32">
                    {move || match review.phase() {
                        Phase::Idle | Phase::Loading => view! { <LoadingBlock label="Reviewing code..." /> }.into_any(),
                        Phase::Success(text) => view! {
                            <div class="prose max-w-none whitespace-pre-wrap text-sm">{text}</div>
                        }.into_any(),
                        Phase::Error(error) => view! {
                            <div role="alert" class="alert alert-error">
                                <AlertTriangle attr:class="h-5 w-5" />
                                <div>
                                    <div class="font-semibold">{error.kind.title()}</div>
                                    <div class="text-sm">{error.message}</div>
                                </div>
                                <button class="btn btn-sm gap-1" on:click=retry>
                                    <RefreshCw attr:class="h-4 w-4" /> "Retry"
                                </button>
                            </div>
                        }.into_any(),
                    }}
                </div>
                <div class="modal-action">
                    <button class="btn" on:click=move |_| close()>"Close"</button>
                </div>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
