mod project;

pub use project::ProjectPage;

use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, Label, Notice, Spinner, Textarea,
};
use crate::state::AppContext;
use crate::util::{non_blank, BusyGuard};
use icons::{Menu, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

pub(crate) const SITE_PROMPT_EXAMPLES: [&str; 5] = [
    "A mindfulness coach website with 3 pages: Home, About, Contact",
    "A modern restaurant website with menu, about, and reservations pages",
    "A portfolio website for a photographer with gallery and contact sections",
    "A small business website for a bakery with home, products, and location pages",
    "A personal blog website with posts, about, and contact pages",
];

pub(crate) fn project_path(website_id: &str) -> String {
    format!("/project/{}", urlencoding::encode(website_id))
}

pub(crate) const NAV_LINKS: [(&str, &str); 2] = [("/dashboard", "Dashboard"), ("/", "New Website")];

#[component]
pub fn Navbar() -> impl IntoView {
    let menu_open: RwSignal<bool> = RwSignal::new(false);

    view! {
        <header class="sticky top-0 z-50 w-full border-b bg-background/70 backdrop-blur">
            <div class="mx-auto flex max-w-6xl items-center justify-between px-4 py-3">
                <a href="/" class="text-xl font-bold text-indigo-600">"AI SiteGen"</a>
                <nav class="hidden items-center gap-6 md:flex">
                    {NAV_LINKS
                        .into_iter()
                        .map(|(href, label)| {
                            view! {
                                <a href=href class="text-sm font-medium text-muted-foreground hover:text-indigo-600">
                                    {label}
                                </a>
                            }
                        })
                        .collect_view()}
                </nav>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    class="md:hidden"
                    attr:aria-label="Toggle menu"
                    attr:aria-expanded=move || menu_open.get().to_string()
                    on:click=move |_| menu_open.update(|open| *open = !*open)
                >
                    <Show when=move || menu_open.get() fallback=|| view! { <Menu class="size-5" /> }>
                        <X class="size-5" />
                    </Show>
                </Button>
            </div>

            <Show when=move || menu_open.get() fallback=|| ().into_view()>
                <nav class="flex flex-col gap-1 border-t px-4 py-2 md:hidden">
                    {NAV_LINKS
                        .into_iter()
                        .map(|(href, label)| {
                            view! {
                                <a
                                    href=href
                                    class="rounded-md px-2 py-2 text-sm font-medium text-muted-foreground hover:bg-muted hover:text-indigo-600"
                                    on:click=move |_| menu_open.set(false)
                                >
                                    {label}
                                </a>
                            }
                        })
                        .collect_view()}
                </nav>
            </Show>
        </header>
    }
}

#[component]
pub fn GeneratorPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let description: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let description_id = use_random_id_for("description");

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let Some(desc) = non_blank(&description.get_untracked()).map(str::to_string) else {
            error.set(Some("Please enter a description for your website.".to_string()));
            return;
        };
        error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        let busy = BusyGuard::new(loading);
        spawn_local(async move {
            let _busy = busy;
            match api_client.generate_website(&desc).await {
                Ok(res) => {
                    log::info!(
                        "generated website {} ({} pages)",
                        res.website_id,
                        res.pages.len()
                    );
                    navigate.with_value(|nav| nav(&project_path(&res.website_id), Default::default()));
                }
                Err(e) => {
                    log::warn!("website generation failed: {e}");
                    error.set(Some(format!(
                        "Failed to generate website. Please try again later. ({e})"
                    )));
                }
            }
        });
    };

    view! {
        <div class="min-h-screen bg-gradient-to-br from-indigo-200 via-purple-100 to-pink-100">
            <main class="mx-auto flex max-w-2xl flex-col items-center px-4 py-16">
                <div class="mb-8 text-center">
                    <h1 class="mb-4 bg-gradient-to-r from-indigo-600 via-purple-600 to-pink-600 bg-clip-text text-5xl font-bold text-transparent">
                        "AI Website Builder"
                    </h1>
                    <p class="text-lg leading-relaxed text-muted-foreground">
                        "Transform your ideas into websites in seconds. Describe what you want and we build it."
                    </p>
                </div>

                <Card class="w-full shadow-lg">
                    <CardHeader>
                        <CardTitle class="text-2xl">"Describe Your Website"</CardTitle>
                        <CardDescription>
                            "Tell us what kind of website you want, and our AI will build it for you"
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for=description_id.clone()>"Website Description"</Label>
                                <Textarea
                                    id=description_id.clone()
                                    placeholder="I want a website for..."
                                    bind_value=description
                                    disabled=loading
                                />
                            </div>

                            <Notice message=error />

                            <Button class="w-full" size=ButtonSize::Lg attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Generating Your Website..." } else { "Generate Website" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>

                    <CardFooter class="flex-col items-start">
                        <h3 class="mb-1 text-sm font-medium">"Example prompts:"</h3>
                        <div class="grid w-full grid-cols-1 gap-2 md:grid-cols-2">
                            {SITE_PROMPT_EXAMPLES
                                .into_iter()
                                .map(|prompt| {
                                    view! {
                                        <button
                                            type="button"
                                            class="rounded-lg bg-muted/40 p-3 text-left text-sm text-muted-foreground transition-colors hover:bg-muted"
                                            disabled=move || loading.get()
                                            on:click=move |_| description.set(prompt.to_string())
                                        >
                                            {format!("\"{prompt}\"")}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </CardFooter>
                </Card>
            </main>
        </div>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());
    let websites = app_state.0.websites;
    let loading = app_state.0.websites_loading;
    let error = app_state.0.websites_error;

    let api_client = app_state.0.api_client.get_untracked();
    let busy = BusyGuard::new(loading);
    spawn_local(async move {
        let _busy = busy;
        match api_client.list_websites().await {
            Ok(list) => {
                websites.set(list);
                error.set(None);
            }
            Err(e) => {
                log::warn!("failed to load websites: {e}");
                websites.set(vec![]);
                error.set(Some(e.to_string()));
            }
        }
    });

    view! {
        <div class="mx-auto max-w-6xl px-4 py-12">
            <h1 class="mb-6 text-3xl font-bold text-primary">"My Websites"</h1>

            <Notice message=error class="mb-4" />

            {move || {
                if loading.get() {
                    return view! {
                        <div class="flex items-center gap-2 text-sm text-muted-foreground">
                            <Spinner />
                            "Loading websites..."
                        </div>
                    }
                    .into_any();
                }

                let sites = websites.get();
                if sites.is_empty() {
                    return view! {
                        <p class="mt-12 text-center text-muted-foreground">
                            "You haven't created any websites yet."
                        </p>
                    }
                    .into_any();
                }

                view! {
                    <div class="grid grid-cols-1 gap-6 sm:grid-cols-2 lg:grid-cols-3">
                        {sites
                            .into_iter()
                            .map(move |site| {
                                let homepage = site
                                    .first_page()
                                    .map(|p| p.name.clone())
                                    .unwrap_or_else(|| "No Homepage".to_string());
                                let name = site.display_name();
                                let desc = site
                                    .description
                                    .clone()
                                    .filter(|d| !d.trim().is_empty())
                                    .unwrap_or_else(|| "No description available".to_string());
                                let href = project_path(&site.id);

                                view! {
                                    <Card class="gap-0 overflow-hidden py-0">
                                        <div class="flex h-40 items-center justify-center bg-muted px-4 text-center text-sm text-muted-foreground">
                                            {homepage}
                                        </div>
                                        <CardHeader class="border-t pt-4">
                                            <CardTitle class="truncate text-lg">{name}</CardTitle>
                                            <CardDescription class="line-clamp-2">{desc}</CardDescription>
                                        </CardHeader>
                                        <CardFooter class="pb-4 pt-4">
                                            <Button
                                                variant=ButtonVariant::Outline
                                                class="w-full"
                                                on:click=move |_| navigate.with_value(|nav| nav(&href, Default::default()))
                                            >
                                                "View Project"
                                            </Button>
                                        </CardFooter>
                                    </Card>
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path_encodes_id() {
        assert_eq!(project_path("3f1c-9a"), "/project/3f1c-9a");
        assert_eq!(project_path("a/b"), "/project/a%2Fb");
    }

    #[test]
    fn test_nav_links_cover_dashboard_and_generator() {
        let hrefs: Vec<&str> = NAV_LINKS.iter().map(|(href, _)| *href).collect();
        assert_eq!(hrefs, vec!["/dashboard", "/"]);
    }

    #[test]
    fn test_prompt_examples_are_not_blank() {
        assert!(SITE_PROMPT_EXAMPLES.iter().all(|p| non_blank(p).is_some()));
    }
}
