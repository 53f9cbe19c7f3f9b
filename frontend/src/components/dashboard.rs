use codesage_shared::{Project, ProjectStatus, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{AuthContext, use_auth};
use crate::components::add_project_dialog::AddProjectDialog;
use crate::components::feedback::{FetchErrorPanel, LoadingBlock, NoticeBanner};
use crate::components::icons::*;
use crate::components::layout::PageShell;
use crate::filter::{EmptyState, ProjectFilter, status_counts};
use crate::notice::Notices;
use crate::resource::{Phase, RemoteResource};
use crate::validation::validate_project_name;
use crate::web::route::AppRoute;
use crate::web::router::Link;

type Projects = RemoteResource<Vec<Project>>;

fn load_projects(auth: AuthContext, projects: Projects) {
    projects.load(async move {
        auth.with_api(|api, token| async move { api.list_projects(&token).await })
            .await
    });
}

pub(crate) fn status_badge(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Created => "badge badge-ghost",
        ProjectStatus::Analyzing => "badge badge-info",
        ProjectStatus::Completed => "badge badge-success",
        ProjectStatus::Error => "badge badge-error",
    }
}

/// 行内编辑与删除确认的共享状态
#[derive(Clone, Copy)]
struct RowState {
    /// 正在重命名的项目
    editing: RwSignal<Option<String>>,
    draft: RwSignal<String>,
    /// 已点击过一次删除、等待确认的项目
    pending_delete: RwSignal<Option<String>>,
    busy: RwSignal<bool>,
    on_rename: Callback<(String, String)>,
    on_delete: Callback<String>,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let notices = Notices::new();
    let projects: Projects = RemoteResource::new();

    let search = RwSignal::new(String::new());
    let status = RwSignal::new(Option::<ProjectStatus>::None);
    let busy = RwSignal::new(false);

    // 用户变化时重新加载（令牌刷新不会触发）
    Effect::new(move |_| {
        if auth.user_id().is_some() {
            load_projects(auth, projects);
        } else {
            projects.abort();
        }
    });

    let filter = Memo::new(move |_| ProjectFilter {
        search: search.get(),
        status: status.get(),
    });
    let visible = Memo::new(move |_| {
        projects.with_data(|list| list.map(|list| filter.with(|f| f.apply(list))))
    });
    let empty_state = Memo::new(move |_| {
        let total = projects.with_data(|list| list.map_or(0, Vec::len));
        let matched = visible.with(|v| v.as_ref().map_or(0, Vec::len));
        EmptyState::of(total, matched)
    });
    let counts = Memo::new(move |_| {
        projects.with_data(|list| list.map(|list| status_counts(list)).unwrap_or_default())
    });
    let total = move || projects.with_data(|list| list.map_or(0, Vec::len));

    let handle_add_project = move |url: String| {
        busy.set(true);
        spawn_local(async move {
            let result = auth
                .with_api(|api, token| async move { api.create_project(&token, &url).await })
                .await;
            let message = result.as_ref().map(|r| r.message.clone()).unwrap_or_default();
            let success = if message.is_empty() { "Project added".to_string() } else { message };
            notices.report(&result, &success, "Failed to add project");
            if result.is_ok() {
                load_projects(auth, projects);
            }
            busy.try_set(false);
        });
    };

    let handle_rename = move |(id, name): (String, String)| {
        if let Err(message) = validate_project_name(&name) {
            notices.error(message);
            return;
        }
        busy.set(true);
        spawn_local(async move {
            let result = auth
                .with_api(|api, token| async move { api.rename_project(&token, &id, &name).await })
                .await;
            notices.report(&result, "Project renamed", "Failed to rename project");
            if result.is_ok() {
                load_projects(auth, projects);
            }
            busy.try_set(false);
        });
    };

    let handle_delete = move |id: String| {
        busy.set(true);
        spawn_local(async move {
            let result = auth
                .with_api(|api, token| async move { api.delete_project(&token, &id).await })
                .await;
            notices.report(&result, "Project deleted", "Failed to delete project");
            // 失败时保留当前列表
            if result.is_ok() {
                load_projects(auth, projects);
            }
            busy.try_set(false);
        });
    };

    let rows = RowState {
        editing: RwSignal::new(None),
        draft: RwSignal::new(String::new()),
        pending_delete: RwSignal::new(None),
        busy,
        on_rename: Callback::new(handle_rename),
        on_delete: Callback::new(handle_delete),
    };

    let retry = Callback::new(move |_| load_projects(auth, projects));

    view! {
        <PageShell>
            <div class="space-y-8">
                <NoticeBanner notices=notices />

                <div class="flex flex-wrap items-center justify-between gap-4">
                    <div>
                        <h1 class="text-3xl font-bold">"Your projects"</h1>
                        <p class="text-base-content/70">"Repositories registered for analysis."</p>
                    </div>
                    <AddProjectDialog on_add=handle_add_project busy=busy />
                </div>

                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <div class="stat">
                        <div class="stat-title">"Total"</div>
                        <div class="stat-value text-primary">{total}</div>
                    </div>
                    <For
                        each=move || counts.get()
                        key=|(status, count)| (*status, *count)
                        children=move |(status, count)| view! {
                            <div class="stat">
                                <div class="stat-title">{status.label()}</div>
                                <div class="stat-value text-2xl">{count}</div>
                            </div>
                        }
                    />
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex flex-wrap items-center gap-3 p-6 pb-2">
                            <label class="input input-bordered flex items-center gap-2 flex-1 min-w-48">
                                <Search attr:class="h-4 w-4 opacity-50" />
                                <input
                                    type="search"
                                    class="grow"
                                    placeholder="Search by name or URL"
                                    prop:value=move || search.get()
                                    on:input=move |ev| search.set(event_target_value(&ev))
                                />
                            </label>
                            <select
                                class="select select-bordered"
                                on:change=move |ev| status.set(ProjectStatus::parse(&event_target_value(&ev)))
                            >
                                <option value="" selected=move || status.get().is_none()>"All statuses"</option>
                                {ProjectStatus::ALL
                                    .into_iter()
                                    .map(|s| view! {
                                        <option value=s.as_str() selected=move || status.get() == Some(s)>
                                            {s.label()}
                                        </option>
                                    })
                                    .collect_view()}
                            </select>
                            <button
                                on:click=move |_| load_projects(auth, projects)
                                disabled=move || projects.is_loading()
                                class="btn btn-ghost btn-circle"
                                aria-label="Refresh"
                            >
                                <RefreshCw attr:class=move || if projects.is_loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                            </button>
                        </div>

                        {move || match projects.phase() {
                            Phase::Idle | Phase::Loading => view! { <LoadingBlock label="Loading projects..." /> }.into_any(),
                            Phase::Error(error) => view! {
                                <div class="p-6">
                                    <FetchErrorPanel error=error on_retry=retry />
                                </div>
                            }.into_any(),
                            Phase::Success(_) => view! { <ProjectTable visible=visible empty_state=empty_state rows=rows /> }.into_any(),
                        }}
                    </div>
                </div>
            </div>
        </PageShell>
    }
}

#[component]
fn ProjectTable(
    visible: Memo<Option<Vec<Project>>>,
    empty_state: Memo<EmptyState>,
    rows: RowState,
) -> impl IntoView {
    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"Project"</th>
                        <th>"Repository"</th>
                        <th>"Status"</th>
                        <th class="hidden md:table-cell">"Created"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {move || match empty_state.get() {
                        EmptyState::NoData => Some(view! {
                            <tr>
                                <td colspan="5" class="text-center py-8 text-base-content/50">
                                    "No projects yet. Add a GitHub repository to get started."
                                </td>
                            </tr>
                        }.into_any()),
                        EmptyState::NoMatches => Some(view! {
                            <tr>
                                <td colspan="5" class="text-center py-8 text-base-content/50">
                                    "No projects match your search."
                                </td>
                            </tr>
                        }.into_any()),
                        EmptyState::Populated => None,
                    }}
                    <For
                        each=move || visible.get().unwrap_or_default()
                        key=|p| (p.id.clone(), p.name.clone(), p.status)
                        children=move |project| view! { <ProjectRow project=project rows=rows /> }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn ProjectRow(project: Project, rows: RowState) -> impl IntoView {
    let id = StoredValue::new(project.id.clone());
    let is_editing = move || rows.editing.with(|e| e.as_deref() == Some(id.get_value().as_str()));
    let is_pending = move || rows.pending_delete.with(|p| p.as_deref() == Some(id.get_value().as_str()));

    let name = project.name.clone();
    let start_edit = move |_| {
        rows.pending_delete.set(None);
        rows.draft.set(name.clone());
        rows.editing.set(Some(id.get_value()));
    };
    let commit_edit = move || {
        rows.editing.set(None);
        rows.on_rename.run((id.get_value(), rows.draft.get_untracked()));
    };
    let on_delete_click = move |_| {
        if is_pending() {
            rows.pending_delete.set(None);
            rows.on_delete.run(id.get_value());
        } else {
            rows.pending_delete.set(Some(id.get_value()));
        }
    };

    let slug = project.repo_slug().unwrap_or_else(|| "-".to_string());
    let created = date::format_date(&project.created_at);
    let target = AppRoute::Project(project.id.clone()).to_path();
    let project_name = project.name.clone();

    view! {
        <tr>
            <td>
                <Show
                    when=is_editing
                    fallback=move || {
                        let to = target.clone();
                        let name = project_name.clone();
                        view! { <Link to=to class="link link-hover font-semibold">{name}</Link> }
                    }
                >
                    <form
                        class="join"
                        on:submit=move |ev: leptos::web_sys::SubmitEvent| {
                            ev.prevent_default();
                            commit_edit();
                        }
                    >
                        <input
                            class="input input-bordered input-sm join-item"
                            prop:value=move || rows.draft.get()
                            on:input=move |ev| rows.draft.set(event_target_value(&ev))
                        />
                        <button type="submit" class="btn btn-sm btn-primary join-item" aria-label="Save name">
                            <Check attr:class="h-4 w-4" />
                        </button>
                        <button
                            type="button"
                            class="btn btn-sm join-item"
                            aria-label="Cancel rename"
                            on:click=move |_| rows.editing.set(None)
                        >
                            <X attr:class="h-4 w-4" />
                        </button>
                    </form>
                </Show>
            </td>
            <td>
                <a href=project.github_url.clone() target="_blank" rel="noopener noreferrer"
                    class="flex items-center gap-2 font-mono text-sm opacity-70 link link-hover">
                    <Github attr:class="h-4 w-4 opacity-50" />
                    {slug}
                </a>
            </td>
            <td>
                <span class=status_badge(project.status)>{project.status.label()}</span>
            </td>
            <td class="hidden md:table-cell text-sm opacity-70">{created}</td>
            <td>
                <div class="flex justify-end gap-1">
                    <button
                        class="btn btn-ghost btn-sm btn-square"
                        aria-label="Rename"
                        disabled=move || rows.busy.get()
                        on:click=start_edit
                    >
                        <Pencil attr:class="h-4 w-4" />
                    </button>
                    <button
                        class=move || if is_pending() { "btn btn-error btn-sm" } else { "btn btn-ghost btn-sm btn-square text-error" }
                        aria-label="Delete"
                        disabled=move || rows.busy.get()
                        on:click=on_delete_click
                    >
                        <Trash2 attr:class="h-4 w-4" />
                        <Show when=is_pending>"Confirm"</Show>
                    </button>
                </div>
            </td>
        </tr>
    }
}
