use codesage_shared::github;
use leptos::prelude::*;

use crate::components::feedback::FieldError;
use crate::components::icons::{Github, Plus};
use crate::validation::{Field, FieldErrors};

mod form_state;

use form_state::FormState;

#[component]
pub fn AddProjectDialog(
    /// 校验通过的仓库地址
    #[prop(into)]
    on_add: Callback<String>,
    #[prop(into)] busy: Signal<bool>,
) -> impl IntoView {
    let (open, set_open) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let form = FormState::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() && dialog.show_modal().is_err() {
                    log::warn!("[dashboard] add-project dialog could not be opened");
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if let Some(url) = form.submission() {
            on_add.run(url);
            set_open.set(false);
            form.reset();
        }
    };

    let preview = move || {
        form.github_url
            .with(|url| github::repo_slug(url))
            .map(|slug| view! {
                <span class="label-text-alt text-base-content/60">"Repository: " {slug}</span>
            })
    };

    view! {
        // 触发按钮
        <button
            class="btn btn-primary gap-2"
            disabled=move || busy.get()
            on:click=move |_| set_open.set(true)
        >
            <Plus attr:class="h-4 w-4" /> "Add project"
        </button>

        // 模态框内容
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"Add a repository"</h3>
                <p class="py-4 text-base-content/70">
                    "Paste the URL of a public GitHub repository. Analysis starts right after it is added."
                </p>

                <form on:submit=on_submit class="space-y-4" novalidate>
                    <div class="form-control">
                        <label for="github_url" class="label">
                            <span class="label-text">"GitHub URL"</span>
                        </label>
                        <label class="input input-bordered flex items-center gap-2 w-full">
                            <Github attr:class="h-4 w-4 opacity-50" />
                            <input
                                id="github_url"
                                type="url"
                                class="grow"
                                placeholder="https://github.com/owner/repo"
                                on:input=move |ev| form.github_url.set(event_target_value(&ev))
                                prop:value=move || form.github_url.get()
                            />
                        </label>
                        {move || if form.errors.with(FieldErrors::is_empty) {
                            view! { <label class="label">{preview}</label> }.into_any()
                        } else {
                            view! { <FieldError errors=form.errors field=Field::GithubUrl /> }.into_any()
                        }}
                    </div>

                    <div class="modal-action">
                        <button
                            type="button"
                            class="btn btn-ghost"
                            on:click=move |_| {
                                set_open.set(false);
                                form.reset();
                            }
                        >
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary">"Add project"</button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
