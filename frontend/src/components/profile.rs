use codesage_shared::{BIO_MAX_CHARS, Profile};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{AuthContext, use_auth};
use crate::components::feedback::{FetchErrorPanel, FieldError, LoadingBlock, NoticeBanner};
use crate::components::icons::{Pencil, User};
use crate::components::layout::PageShell;
use crate::notice::Notices;
use crate::resource::{Phase, RemoteResource};
use crate::validation::{Field, FieldErrors, validate_profile};

fn load_profile(auth: AuthContext, profile: RemoteResource<Profile>) {
    profile.load(async move {
        auth.with_api(|api, token| async move { api.load_profile(&token).await })
            .await
    });
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let notices = Notices::new();
    let profile = RemoteResource::<Profile>::new();

    let editing = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let display_name = RwSignal::new(String::new());
    let bio = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());

    Effect::new(move |_| {
        if auth.user_id().is_some() {
            load_profile(auth, profile);
        } else {
            profile.abort();
        }
    });

    let start_edit = move |_| {
        let current = profile.with_data(|p| p.cloned()).unwrap_or_default();
        display_name.set(current.display_name);
        bio.set(current.bio);
        errors.set(FieldErrors::default());
        editing.set(true);
    };

    let on_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = Profile {
            display_name: display_name.get_untracked().trim().to_string(),
            bio: bio.get_untracked().trim().to_string(),
        };
        if let Err(field_errors) = validate_profile(&draft.display_name, &draft.bio) {
            errors.set(field_errors);
            return;
        }
        errors.set(FieldErrors::default());
        saving.set(true);
        spawn_local(async move {
            let result = auth
                .with_api(|api, token| async move { api.save_profile(&token, draft).await })
                .await;
            notices.report(&result, "Profile saved", "Failed to save profile");
            if result.is_ok() {
                editing.try_set(false);
                load_profile(auth, profile);
            }
            saving.try_set(false);
        });
    };

    let email = move || auth.session().map(|s| s.email).unwrap_or_default();
    let retry = Callback::new(move |_| load_profile(auth, profile));

    let view_mode = move |current: Profile| {
        let name = if current.display_name.is_empty() {
            "No display name yet".to_string()
        } else {
            current.display_name
        };
        let bio_text = if current.bio.is_empty() {
            "Tell others about yourself.".to_string()
        } else {
            current.bio
        };
        view! {
            <div class="space-y-4">
                <div>
                    <div class="text-sm text-base-content/60">"Display name"</div>
                    <div class="text-lg font-semibold">{name}</div>
                </div>
                <div>
                    <div class="text-sm text-base-content/60">"Bio"</div>
                    <p class="whitespace-pre-wrap">{bio_text}</p>
                </div>
                <button class="btn btn-outline gap-2" on:click=start_edit>
                    <Pencil attr:class="h-4 w-4" /> "Edit profile"
                </button>
            </div>
        }
    };

    let edit_mode = move || {
        view! {
            <form class="space-y-4" on:submit=on_save novalidate>
                <div class="form-control">
                    <label class="label" for="display_name"><span class="label-text">"Display name"</span></label>
                    <input
                        id="display_name"
                        class="input input-bordered"
                        prop:value=move || display_name.get()
                        on:input=move |ev| display_name.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field=Field::DisplayName />
                </div>
                <div class="form-control">
                    <label class="label" for="bio">
                        <span class="label-text">"Bio"</span>
                        <span class="label-text-alt">
                            {move || format!("{}/{}", bio.with(|b| b.chars().count()), BIO_MAX_CHARS)}
                        </span>
                    </label>
                    <textarea
                        id="bio"
                        class="textarea textarea-bordered h-32"
                        maxlength=BIO_MAX_CHARS.to_string()
                        prop:value=move || bio.get()
                        on:input=move |ev| bio.set(event_target_value(&ev))
                    ></textarea>
                    <FieldError errors=errors field=Field::Bio />
                </div>
                <div class="flex gap-2">
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                        {move || if saving.get() {
                            view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                        } else {
                            "Save".into_any()
                        }}
                    </button>
                    <button
                        type="button"
                        class="btn btn-ghost"
                        disabled=move || saving.get()
                        on:click=move |_| editing.set(false)
                    >
                        "Cancel"
                    </button>
                </div>
            </form>
        }
    };

    view! {
        <PageShell>
            <div class="max-w-2xl mx-auto space-y-6">
                <NoticeBanner notices=notices />
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex items-center gap-3 mb-2">
                            <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                                <User attr:class="h-6 w-6" />
                            </div>
                            <div>
                                <h1 class="card-title text-2xl">"Your profile"</h1>
                                <p class="text-sm text-base-content/60">{email}</p>
                            </div>
                        </div>
                        {move || match profile.phase() {
                            Phase::Idle | Phase::Loading => view! { <LoadingBlock label="Loading profile..." /> }.into_any(),
                            Phase::Error(error) => view! {
                                <FetchErrorPanel error=error on_retry=retry show_back=true />
                            }.into_any(),
                            Phase::Success(current) => {
                                if editing.get() { edit_mode().into_any() } else { view_mode(current).into_any() }
                            }
                        }}
                    </div>
                </div>
            </div>
        </PageShell>
    }
}
