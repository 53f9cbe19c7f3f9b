//! 公开的介绍页面

use leptos::prelude::*;

use crate::components::icons::{FileCode, Github, Search, Sparkles};
use crate::components::layout::PageShell;
use crate::web::router::Link;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <PageShell>
            <div class="hero py-16">
                <div class="hero-content text-center">
                    <div class="max-w-2xl space-y-6">
                        <h1 class="text-5xl font-bold">"Understand any codebase in minutes"</h1>
                        <p class="text-lg text-base-content/70">
                            "Connect a GitHub repository and CodeSage maps its files, functions and classes, "
                            "summarises what they do, and reviews your code with AI."
                        </p>
                        <div class="flex justify-center gap-3">
                            <Link to="/signup" class="btn btn-primary">"Get started free"</Link>
                            <Link to="/features" class="btn btn-ghost">"See features"</Link>
                        </div>
                    </div>
                </div>
            </div>
        </PageShell>
    }
}

#[component]
fn FeatureCard(title: &'static str, body: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="text-primary">{children()}</div>
                <h3 class="card-title">{title}</h3>
                <p class="text-base-content/70">{body}</p>
            </div>
        </div>
    }
}

#[component]
pub fn FeaturesPage() -> impl IntoView {
    view! {
        <PageShell>
            <h1 class="text-4xl font-bold text-center mb-10">"Features"</h1>
            <div class="grid gap-6 md:grid-cols-2">
                <FeatureCard
                    title="Repository import"
                    body="Paste a GitHub URL and the analysis pipeline clones and parses the repository for you."
                >
                    <Github attr:class="h-8 w-8" />
                </FeatureCard>
                <FeatureCard
                    title="Structure map"
                    body="Every file with its functions, classes and variables, their line numbers and docstrings."
                >
                    <FileCode attr:class="h-8 w-8" />
                </FeatureCard>
                <FeatureCard
                    title="Fast search"
                    body="Filter files by path, construct name or language without another round trip."
                >
                    <Search attr:class="h-8 w-8" />
                </FeatureCard>
                <FeatureCard
                    title="AI code review"
                    body="Ask for a review of any snippet and get actionable suggestions in seconds."
                >
                    <Sparkles attr:class="h-8 w-8" />
                </FeatureCard>
            </div>
        </PageShell>
    }
}

#[component]
fn PricingTier(
    name: &'static str,
    price: &'static str,
    perks: &'static [&'static str],
    #[prop(optional)] highlighted: bool,
) -> impl IntoView {
    let class = if highlighted {
        "card bg-base-100 shadow-xl border-2 border-primary"
    } else {
        "card bg-base-100 shadow-xl"
    };
    view! {
        <div class=class>
            <div class="card-body">
                <h3 class="card-title">{name}</h3>
                <p class="text-3xl font-bold">{price}</p>
                <ul class="list-disc list-inside text-base-content/70 space-y-1">
                    {perks.iter().map(|perk| view! { <li>{*perk}</li> }).collect_view()}
                </ul>
                <div class="card-actions mt-4">
                    <Link to="/signup" class="btn btn-primary btn-block">"Choose plan"</Link>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn PricingPage() -> impl IntoView {
    view! {
        <PageShell>
            <h1 class="text-4xl font-bold text-center mb-10">"Pricing"</h1>
            <div class="grid gap-6 md:grid-cols-3">
                <PricingTier name="Hobby" price="$0" perks=&["3 repositories", "Structure map", "Community support"] />
                <PricingTier
                    name="Pro"
                    price="$12 / month"
                    perks=&["Unlimited repositories", "AI code review", "Class summaries"]
                    highlighted=true
                />
                <PricingTier name="Team" price="Contact us" perks=&["Shared workspaces", "SSO", "Priority support"] />
            </div>
        </PageShell>
    }
}
