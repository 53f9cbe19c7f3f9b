//! 注册页面（两步向导）

use codesage_shared::BIO_MAX_CHARS;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::CodeSageApi;
use crate::auth::{SubmitError, use_auth};
use crate::components::feedback::FieldError;
use crate::components::icons::{AlertTriangle, Sparkles};
use crate::config;
use crate::identity::{IdentityClient, now_millis};
use crate::signup::{SignupWizard, Step, complete_signup};
use crate::validation::Field;
use crate::web::router::Link;

#[component]
pub fn SignupPage() -> impl IntoView {
    let auth = use_auth();
    let wizard = RwSignal::new(SignupWizard::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let step = Memo::new(move |_| wizard.with(|w| w.step()));
    let errors = Signal::derive(move || wizard.with(|w| w.errors().clone()));

    let on_next = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);
        wizard.update(|w| {
            w.advance();
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let mut submitted = wizard.get_untracked();
        spawn_local(async move {
            let app = config::get();
            let identity = IdentityClient::from_config(app);
            let api = CodeSageApi::from_config(app);
            let result = complete_signup(&identity, &api, &mut submitted, now_millis()).await;
            // 向导可能被切回第一步或带上字段错误
            wizard.try_update(|w| w.adopt_outcome(&submitted));
            match result {
                Ok(session) => auth.sign_in(session),
                Err(SubmitError::Invalid(_)) => {}
                Err(e) => {
                    set_error_msg.try_set(Some(e.to_string()));
                }
            }
            set_is_submitting.try_set(false);
        });
    };

    let credentials_step = move || {
        view! {
            <form class="card-body" on:submit=on_next novalidate>
                <div class="form-control">
                    <label class="label" for="email"><span class="label-text">"Email"</span></label>
                    <input
                        id="email"
                        type="email"
                        autocomplete="email"
                        class="input input-bordered"
                        prop:value=move || wizard.with(|w| w.credentials.email.clone())
                        on:input=move |ev| wizard.update(|w| w.credentials.email = event_target_value(&ev))
                    />
                    <FieldError errors=errors field=Field::Email />
                </div>
                <div class="form-control">
                    <label class="label" for="password"><span class="label-text">"Password"</span></label>
                    <input
                        id="password"
                        type="password"
                        autocomplete="new-password"
                        class="input input-bordered"
                        prop:value=move || wizard.with(|w| w.credentials.password.clone())
                        on:input=move |ev| wizard.update(|w| w.credentials.password = event_target_value(&ev))
                    />
                    <FieldError errors=errors field=Field::Password />
                </div>
                <div class="form-control">
                    <label class="label" for="confirm"><span class="label-text">"Confirm password"</span></label>
                    <input
                        id="confirm"
                        type="password"
                        autocomplete="new-password"
                        class="input input-bordered"
                        prop:value=move || wizard.with(|w| w.credentials.confirm.clone())
                        on:input=move |ev| wizard.update(|w| w.credentials.confirm = event_target_value(&ev))
                    />
                    <FieldError errors=errors field=Field::ConfirmPassword />
                </div>
                <div class="form-control mt-6">
                    <button type="submit" class="btn btn-primary">"Next"</button>
                </div>
            </form>
        }
    };

    let profile_step = move || {
        let bio_len = move || wizard.with(|w| w.profile.bio.chars().count());
        view! {
            <form class="card-body" on:submit=on_submit novalidate>
                <p class="text-sm text-base-content/70">"Tell us a little about yourself. Both fields are optional."</p>
                <div class="form-control">
                    <label class="label" for="display_name"><span class="label-text">"Display name"</span></label>
                    <input
                        id="display_name"
                        type="text"
                        class="input input-bordered"
                        prop:value=move || wizard.with(|w| w.profile.display_name.clone())
                        on:input=move |ev| wizard.update(|w| w.profile.display_name = event_target_value(&ev))
                    />
                    <FieldError errors=errors field=Field::DisplayName />
                </div>
                <div class="form-control">
                    <label class="label" for="bio">
                        <span class="label-text">"Bio"</span>
                        <span class="label-text-alt">{move || format!("{}/{}", bio_len(), BIO_MAX_CHARS)}</span>
                    </label>
                    <textarea
                        id="bio"
                        class="textarea textarea-bordered h-24"
                        maxlength=BIO_MAX_CHARS.to_string()
                        prop:value=move || wizard.with(|w| w.profile.bio.clone())
                        on:input=move |ev| wizard.update(|w| w.profile.bio = event_target_value(&ev))
                    ></textarea>
                    <FieldError errors=errors field=Field::Bio />
                </div>
                <div class="flex gap-2 mt-6">
                    <button
                        type="button"
                        class="btn btn-ghost flex-1"
                        disabled=move || is_submitting.get()
                        on:click=move |_| wizard.update(|w| w.back())
                    >
                        "Back"
                    </button>
                    <button type="submit" class="btn btn-primary flex-1" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() {
                            view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                        } else {
                            "Create account".into_any()
                        }}
                    </button>
                </div>
            </form>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4 flex flex-col items-center gap-2">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <Sparkles attr:class="h-8 w-8" />
                    </div>
                    <h1 class="text-3xl font-bold">"Create your account"</h1>
                    <ul class="steps w-full">
                        <li class="step step-primary" data-content=Step::Credentials.number().to_string()>
                            "Account"
                        </li>
                        <li
                            class=move || if step.get() == Step::Profile { "step step-primary" } else { "step" }
                            data-content=Step::Profile.number().to_string()
                        >
                            "Profile"
                        </li>
                    </ul>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    {move || error_msg.get().map(|msg| view! {
                        <div role="alert" class="alert alert-error text-sm py-2 m-4 mb-0">
                            <AlertTriangle attr:class="h-5 w-5" />
                            <span>{msg}</span>
                        </div>
                    })}
                    {move || match step.get() {
                        Step::Credentials => credentials_step().into_any(),
                        Step::Profile => profile_step().into_any(),
                    }}
                </div>

                <p class="text-center text-sm text-base-content/70">
                    "Already have an account? "
                    <Link to="/login" class="link link-primary">"Sign in"</Link>
                </p>
            </div>
        </div>
    }
}
