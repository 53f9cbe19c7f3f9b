//! 单个项目的分析结果页面

use std::collections::BTreeMap;

use codesage_shared::{AnalysisReport, AnalysisStats, Construct, FileAnalysis};
use leptos::prelude::*;

use crate::auth::{AuthContext, use_auth};
use crate::components::feedback::{FetchErrorPanel, LoadingBlock};
use crate::components::icons::*;
use crate::components::layout::PageShell;
use crate::expand::ExpandState;
use crate::filter::{EmptyState, FileFilter};
use crate::resource::{Phase, RemoteResource};
use crate::web::route::AppRoute;
use crate::web::router::Link;

mod code_review_modal;

use code_review_modal::{CodeReviewModal, ReviewTarget};

fn load_analysis(auth: AuthContext, report: RemoteResource<AnalysisReport>, project_id: String) {
    report.load(async move {
        auth.with_api(|api, token| async move { api.get_analysis(&token, &project_id).await })
            .await
    });
}

#[component]
pub fn ProjectPage(project_id: String) -> impl IntoView {
    let auth = use_auth();
    let project_id = StoredValue::new(project_id);
    let report = RemoteResource::<AnalysisReport>::new();

    let search = RwSignal::new(String::new());
    let language = RwSignal::new(Option::<String>::None);
    let expanded = RwSignal::new(ExpandState::default());
    let review_target = RwSignal::new(Option::<ReviewTarget>::None);

    Effect::new(move |_| {
        if auth.user_id().is_some() {
            load_analysis(auth, report, project_id.get_value());
        } else {
            report.abort();
        }
    });

    let filter = Memo::new(move |_| FileFilter {
        search: search.get(),
        language: language.get(),
    });
    let visible = Memo::new(move |_| {
        report
            .with_data(|r| r.map(|r| filter.with(|f| f.apply(&r.files))))
            .unwrap_or_default()
    });
    let empty_state = Memo::new(move |_| {
        let total = report.with_data(|r| r.map_or(0, |r| r.files.len()));
        EmptyState::of(total, visible.with(Vec::len))
    });

    let expand_all = move |_| {
        visible.with_untracked(|files| {
            expanded.update(|e| e.expand_all(files.iter().map(|f| f.file_path.as_str())))
        });
    };
    let collapse_all = move |_| expanded.update(ExpandState::collapse_all);

    let retry = Callback::new(move |_| load_analysis(auth, report, project_id.get_value()));

    view! {
        <PageShell>
            <div class="space-y-6">
                <Link to=AppRoute::Dashboard.to_path() class="btn btn-ghost btn-sm gap-2">
                    <ArrowLeft attr:class="h-4 w-4" /> "Back to dashboard"
                </Link>

                {move || match report.phase() {
                    Phase::Idle | Phase::Loading => view! { <LoadingBlock label="Loading analysis..." /> }.into_any(),
                    Phase::Error(error) => view! {
                        <FetchErrorPanel error=error on_retry=retry show_back=true />
                    }.into_any(),
                    Phase::Success(data) => {
                        let AnalysisReport { stats, readme_content, class_summaries, .. } = data;
                        let languages = stats.languages.clone();
                        view! {
                            <StatsPanel stats=stats constructs=report.with_data(|r| r.map_or(0, AnalysisReport::construct_count)) />
                            {readme_content.filter(|r| !r.trim().is_empty()).map(|readme| view! {
                                <details class="collapse collapse-arrow bg-base-100 shadow">
                                    <summary class="collapse-title font-semibold">"README"</summary>
                                    <div class="collapse-content">
                                        <pre class="whitespace-pre-wrap text-sm">{readme}</pre>
                                    </div>
                                </details>
                            })}
                            {class_summaries.filter(|s| !s.is_empty()).map(|summaries| view! {
                                <ClassSummaries summaries=summaries />
                            })}

                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <div class="flex flex-wrap items-center gap-3">
                                        <label class="input input-bordered flex items-center gap-2 flex-1 min-w-48">
                                            <Search attr:class="h-4 w-4 opacity-50" />
                                            <input
                                                type="search"
                                                class="grow"
                                                placeholder="Search files or constructs"
                                                prop:value=move || search.get()
                                                on:input=move |ev| search.set(event_target_value(&ev))
                                            />
                                        </label>
                                        <select
                                            class="select select-bordered"
                                            on:change=move |ev| {
                                                let value = event_target_value(&ev);
                                                language.set((!value.is_empty()).then_some(value));
                                            }
                                        >
                                            <option value="" selected=move || language.with(Option::is_none)>"All languages"</option>
                                            {languages
                                                .into_iter()
                                                .map(|lang| {
                                                    let current = lang.clone();
                                                    let value = lang.clone();
                                                    view! {
                                                        <option
                                                            value=value
                                                            selected=move || language.with(|l| l.as_deref() == Some(current.as_str()))
                                                        >
                                                            {lang}
                                                        </option>
                                                    }
                                                })
                                                .collect_view()}
                                        </select>
                                        <button class="btn btn-ghost btn-sm" on:click=expand_all>"Expand all"</button>
                                        <button
                                            class="btn btn-ghost btn-sm"
                                            disabled=move || expanded.with(ExpandState::is_empty)
                                            on:click=collapse_all
                                        >
                                            "Collapse all"
                                        </button>
                                    </div>

                                    {move || match empty_state.get() {
                                        EmptyState::NoData => Some(view! {
                                            <p class="text-center py-8 text-base-content/50">"No files were analyzed for this project."</p>
                                        }.into_any()),
                                        EmptyState::NoMatches => Some(view! {
                                            <p class="text-center py-8 text-base-content/50">"No files match your filters."</p>
                                        }.into_any()),
                                        EmptyState::Populated => None,
                                    }}

                                    <div class="divide-y divide-base-200">
                                        <For
                                            each=move || visible.get()
                                            key=|f| f.file_path.clone()
                                            children=move |file| view! {
                                                <FileSection file=file expanded=expanded review_target=review_target />
                                            }
                                        />
                                    </div>
                                </div>
                            </div>
                        }.into_any()
                    }
                }}

                <CodeReviewModal target=review_target />
            </div>
        </PageShell>
    }
}

#[component]
fn StatsPanel(stats: AnalysisStats, constructs: usize) -> impl IntoView {
    view! {
        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Files"</div>
                <div class="stat-value text-primary">{stats.total_files}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Parsed"</div>
                <div class="stat-value">{stats.parsed_files}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Constructs"</div>
                <div class="stat-value">{constructs}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Languages"</div>
                <div class="stat-desc text-base mt-2">{stats.languages.join(", ")}</div>
            </div>
        </div>
    }
}

#[component]
fn ClassSummaries(summaries: BTreeMap<String, String>) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h2 class="card-title">"Class summaries"</h2>
                <dl class="space-y-3">
                    {summaries
                        .into_iter()
                        .map(|(name, summary)| view! {
                            <div>
                                <dt class="font-mono font-semibold">{name}</dt>
                                <dd class="text-sm text-base-content/70 whitespace-pre-wrap">{summary}</dd>
                            </div>
                        })
                        .collect_view()}
                </dl>
            </div>
        </div>
    }
}

#[component]
fn FileSection(
    file: FileAnalysis,
    expanded: RwSignal<ExpandState>,
    review_target: RwSignal<Option<ReviewTarget>>,
) -> impl IntoView {
    let path = StoredValue::new(file.file_path.clone());
    let is_open = move || path.with_value(|p| expanded.with(|e| e.is_expanded(p)));
    let toggle = move |_| {
        path.with_value(|p| {
            expanded.update(|e| {
                e.toggle(p);
            })
        });
    };

    let badge = file.language.clone();
    let language = StoredValue::new(file.language.clone());
    let count = file.constructs.len();
    let constructs = StoredValue::new(file.constructs);

    view! {
        <div class="py-2">
            <button class="flex w-full items-center gap-2 py-2 text-left" on:click=toggle>
                {move || if is_open() {
                    view! { <ChevronDown attr:class="h-4 w-4" /> }.into_any()
                } else {
                    view! { <ChevronRight attr:class="h-4 w-4" /> }.into_any()
                }}
                <FileCode attr:class="h-4 w-4 opacity-60" />
                <span class="font-mono text-sm flex-1">{file.file_path.clone()}</span>
                <span class="badge badge-ghost">{badge}</span>
                <span class="text-xs opacity-60">{count} " constructs"</span>
            </button>
            <Show when=is_open>
                <div class="pl-6 space-y-3 pb-2">
                    {constructs
                        .get_value()
                        .into_iter()
                        .map(|c| view! {
                            <ConstructCard construct=c language=language.get_value() review_target=review_target />
                        })
                        .collect_view()}
                </div>
            </Show>
        </div>
    }
}

#[component]
fn ConstructCard(
    construct: Construct,
    language: String,
    review_target: RwSignal<Option<ReviewTarget>>,
) -> impl IntoView {
    let line = construct.line_number().map(|n| format!("line {}", n));
    let snippet = construct.code_snippet.clone().filter(|s| !s.trim().is_empty());
    let review = snippet.clone().map(|code| {
        let target = ReviewTarget {
            title: construct.name.clone(),
            code,
            language,
        };
        view! {
            <button
                class="btn btn-outline btn-primary btn-xs gap-1"
                on:click=move |_| review_target.set(Some(target.clone()))
            >
                <Sparkles attr:class="h-3 w-3" /> "Review"
            </button>
        }
    });

    view! {
        <div class="rounded-lg border border-base-200 p-3 space-y-2">
            <div class="flex flex-wrap items-center gap-2">
                <span class="badge badge-outline">{construct.kind.label()}</span>
                <span class="font-mono font-semibold">{construct.name.clone()}</span>
                {line.map(|l| view! { <span class="text-xs opacity-60">{l}</span> })}
                <span class="flex-1"></span>
                {review}
            </div>
            {construct.documentation.clone().filter(|d| !d.trim().is_empty()).map(|doc| view! {
                <p class="text-sm text-base-content/70 whitespace-pre-wrap">{doc}</p>
            })}
            {snippet.map(|code| view! {
                <pre class="bg-base-200 rounded p-3 text-xs overflow-x-auto"><code>{code}</code></pre>
            })}
        </div>
    }
}
