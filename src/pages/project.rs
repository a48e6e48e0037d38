use crate::api::ApiErrorKind;
use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, Label, Notice, Spinner, Textarea,
};
use crate::editor::VisualEditor;
use crate::models::{Page, Viewport, Website};
use crate::preview::PagePreview;
use crate::state::AppContext;
use crate::util::{non_blank, BusyGuard};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::params::Params;
use strum::IntoEnumIterator;

pub(crate) const EDIT_PROMPT_EXAMPLES: [&str; 4] = [
    "Make the background white and center all text",
    "Change the color scheme to dark mode",
    "Add a hero section with a call-to-action button",
    "Make the text larger and more readable",
];

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ProjectRouteParams {
    pub id: Option<String>,
}

pub(crate) fn find_page<'a>(website: &'a Website, name: &str) -> Option<&'a Page> {
    website
        .pages
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// A page returned by an edit, tagged with the website it was made against.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PageUpdate {
    pub website_id: String,
    pub page: Page,
}

/// Replaces the edited page when `update` still belongs to the loaded website.
/// Returns the name of the replaced page.
pub(crate) fn apply_page_update(website: &mut Option<Website>, update: PageUpdate) -> Option<String> {
    let site = website.as_mut().filter(|w| w.id == update.website_id)?;
    let name = update.page.name.clone();
    site.replace_page(update.page).then_some(name)
}

/// Header line under the page name; blank descriptions are not shown.
pub(crate) fn page_description(page: &Page) -> Option<String> {
    non_blank(&page.description).map(str::to_string)
}

fn pages_generated_label(count: usize) -> String {
    match count {
        1 => "1 page generated".to_string(),
        n => format!("{n} pages generated"),
    }
}

#[component]
pub fn ProjectPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = leptos_router::hooks::use_params::<ProjectRouteParams>();
    let navigate = StoredValue::new(use_navigate());

    let website: RwSignal<Option<Website>> = RwSignal::new(None);
    let selected_name: RwSignal<Option<String>> = RwSignal::new(None);
    let show_editor: RwSignal<bool> = RwSignal::new(false);
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);

    // Ignore responses for an id we already navigated away from.
    let request_id: RwSignal<u64> = RwSignal::new(0);
    let settled: RwSignal<Option<u64>> = RwSignal::new(None);
    let loading = Signal::derive(move || settled.get() != Some(request_id.get()));

    let website_id = move || params.get().ok().and_then(|p| p.id).unwrap_or_default();

    Effect::new(move |_| {
        let id = website_id();
        let rid = request_id.get_untracked().wrapping_add(1);
        request_id.set(rid);
        website.set(None);
        selected_name.set(None);
        show_editor.set(false);
        load_error.set(None);

        if id.trim().is_empty() {
            load_error.set(Some("Website not found.".to_string()));
            settled.set(Some(rid));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let res = api_client.get_website(&id).await;
            if request_id.get_untracked() != rid {
                return;
            }
            match res {
                Ok(site) => {
                    log::info!("loaded website {} ({} pages)", site.id, site.pages.len());
                    selected_name.set(site.first_page().map(|p| p.name.clone()));
                    website.set(Some(site));
                }
                Err(e) if e.kind == ApiErrorKind::NotFound => {
                    load_error.set(Some("Website not found.".to_string()));
                }
                Err(e) => {
                    log::warn!("failed to load website {id}: {e}");
                    load_error.set(Some(format!("Failed to load website. ({e})")));
                }
            }
            settled.set(Some(rid));
        });
    });

    let selected_page = Memo::new(move |_| {
        let name = selected_name.get()?;
        website.with(|w| w.as_ref().and_then(|w| find_page(w, &name).cloned()))
    });
    let page_sig = Signal::derive(move || selected_page.get().unwrap_or_default());

    let on_select = Callback::new(move |name: String| {
        selected_name.set(Some(name));
        show_editor.set(false);
    });

    // Edits finish asynchronously; one made against another website (the route
    // changed meanwhile) is dropped instead of overwriting a same-named page.
    let on_page_update = Callback::new(move |update: PageUpdate| {
        let target = update.website_id.clone();
        let name = update.page.name.clone();
        let mut applied = None;
        website.maybe_update(|w| {
            applied = apply_page_update(w, update);
            applied.is_some()
        });
        match applied {
            Some(name) => selected_name.set(Some(name)),
            None => log::warn!("dropped update of page {name}: website {target} is not loaded"),
        }
    });

    let loaded_id = Signal::derive(move || {
        website.with(|w| w.as_ref().map(|w| w.id.clone()).unwrap_or_default())
    });

    let on_visual_update = Callback::new(move |page: Page| {
        on_page_update.run(PageUpdate {
            website_id: loaded_id.get_untracked(),
            page,
        });
    });

    // Page saves replace `website`; the shell only re-renders when presence flips.
    let has_website = Memo::new(move |_| website.with(Option::is_some));
    let site_name = Memo::new(move |_| website.with(|w| w.as_ref().map(Website::display_name).unwrap_or_default()));
    let page_name = Memo::new(move |_| page_sig.with(|p| p.name.clone()));
    let page_desc = Memo::new(move |_| page_sig.with(page_description));

    let go_dashboard = move |_: web_sys::MouseEvent| {
        navigate.with_value(|nav| nav("/dashboard", Default::default()));
    };

    view! {
        {move || {
            if loading.get() {
                return view! {
                    <div class="flex min-h-[60vh] items-center justify-center gap-2 text-muted-foreground">
                        <Spinner class="size-6 text-indigo-500" />
                        "Loading website..."
                    </div>
                }
                .into_any();
            }

            if !has_website.get() {
                let message = load_error.get().unwrap_or_else(|| "Website not found.".to_string());
                return view! {
                    <div class="flex min-h-[60vh] flex-col items-center justify-center gap-4">
                        <p class="text-destructive">{message}</p>
                        <Button variant=ButtonVariant::Outline on:click=go_dashboard>
                            "Back to Dashboard"
                        </Button>
                    </div>
                }
                .into_any();
            }

            view! {
                <div class="flex h-[calc(100vh-57px)] bg-gray-50">
                    <PageList
                        website=website
                        selected_name=selected_name
                        on_select=on_select
                        on_new=Callback::new(move |_: ()| navigate.with_value(|nav| nav("/", Default::default())))
                    />

                    <main class="flex flex-1 flex-col overflow-hidden">
                        <header class="flex items-center justify-between gap-4 border-b bg-white px-6 py-4">
                            <div class="min-w-0">
                                <p class="truncate text-xs font-medium uppercase tracking-wide text-muted-foreground">
                                    {move || site_name.get()}
                                </p>
                                <h1 class="truncate text-xl font-semibold">{move || page_name.get()}</h1>
                                {move || page_desc.get().map(|d| view! { <p class="truncate text-sm text-muted-foreground">{d}</p> })}
                            </div>
                            <ViewportToggle viewport=viewport />
                        </header>

                        <div class="flex-1 overflow-auto p-6">
                            <Show
                                when=move || selected_page.with(Option::is_some)
                                fallback=|| view! {
                                    <p class="mt-12 text-center text-muted-foreground">"Select a page to preview."</p>
                                }
                            >
                                <div class="mb-4 flex items-center justify-between">
                                    <h2 class="text-lg font-medium">"Page Preview"</h2>
                                    <Button
                                        variant=ButtonVariant::Edit
                                        size=ButtonSize::Sm
                                        on:click=move |_| show_editor.update(|v| *v = !*v)
                                    >
                                        {move || if show_editor.get() { "View Mode" } else { "Edit Mode" }}
                                    </Button>
                                </div>

                                <Show
                                    when=move || show_editor.get()
                                    fallback=move || view! { <PagePreview page=page_sig viewport=viewport /> }
                                >
                                    <VisualEditor
                                        page=page_sig
                                        viewport=viewport
                                        on_page_update=on_visual_update
                                    />
                                </Show>

                                <AiEditPrompt
                                    website_id=loaded_id
                                    page=page_sig
                                    on_page_update=on_page_update
                                />
                            </Show>
                        </div>
                    </main>
                </div>
            }
            .into_any()
        }}
    }
}

#[component]
fn PageList(
    website: RwSignal<Option<Website>>,
    selected_name: RwSignal<Option<String>>,
    on_select: Callback<String>,
    on_new: Callback<()>,
) -> impl IntoView {
    let names = Memo::new(move |_| {
        website.with(|w| {
            w.as_ref()
                .map(|w| w.pages.iter().map(|p| p.name.clone()).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    });

    view! {
        <aside class="flex w-64 shrink-0 flex-col border-r bg-white">
            <div class="flex items-center justify-between border-b px-4 py-3">
                <h2 class="text-sm font-semibold">"Pages"</h2>
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| on_new.run(())>
                    "New Website"
                </Button>
            </div>

            <nav class="flex-1 overflow-y-auto p-2">
                {move || {
                    let list = names.get();
                    if list.is_empty() {
                        return view! {
                            <p class="px-2 py-4 text-xs text-muted-foreground">"No pages yet."</p>
                        }
                        .into_any();
                    }

                    list.into_iter()
                        .map(|name| {
                            let for_click = name.clone();
                            let for_class = name.clone();
                            view! {
                                <button
                                    type="button"
                                    class=move || {
                                        let active = selected_name.with(|s| {
                                            s.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(&for_class))
                                        });
                                        if active {
                                            "w-full truncate rounded-md bg-indigo-50 px-3 py-2 text-left text-sm font-medium text-indigo-700"
                                        } else {
                                            "w-full truncate rounded-md px-3 py-2 text-left text-sm transition-colors hover:bg-muted"
                                        }
                                    }
                                    on:click=move |_| on_select.run(for_click.clone())
                                >
                                    {name}
                                </button>
                            }
                        })
                        .collect_view()
                        .into_any()
                }}
            </nav>

            <div class="border-t px-4 py-3 text-xs text-muted-foreground">
                {move || pages_generated_label(names.with(Vec::len))}
            </div>
        </aside>
    }
}

#[component]
fn ViewportToggle(viewport: RwSignal<Viewport>) -> impl IntoView {
    view! {
        <div class="flex items-center gap-1 rounded-md border bg-muted/30 p-1" role="group" aria-label="Viewport">
            {Viewport::iter()
                .map(|vp| {
                    view! {
                        <button
                            type="button"
                            class=move || {
                                if viewport.get() == vp {
                                    "h-7 rounded px-3 text-xs font-medium bg-primary text-primary-foreground shadow-xs"
                                } else {
                                    "h-7 rounded px-3 text-xs font-medium text-muted-foreground hover:bg-accent"
                                }
                            }
                            aria-pressed=move || (viewport.get() == vp).to_string()
                            on:click=move |_| viewport.set(vp)
                        >
                            {vp.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Natural-language edit of the current page through the backend.
#[component]
fn AiEditPrompt(
    #[prop(into)] website_id: Signal<String>,
    #[prop(into)] page: Signal<Page>,
    on_page_update: Callback<PageUpdate>,
) -> impl IntoView {
    let prompt: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let busy: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let prompt_id = use_random_id_for("edit_prompt");

    let apply = move |_: web_sys::MouseEvent| {
        if busy.get_untracked() {
            return;
        }
        let Some(instruction) = non_blank(&prompt.get_untracked()).map(str::to_string) else {
            error.set(Some("Please enter a prompt to edit the page.".to_string()));
            return;
        };
        error.set(None);

        let id = website_id.get_untracked();
        let page_name = page.with_untracked(|p| p.name.clone());
        let api_client = app_state.0.api_client.get_untracked();
        let guard = BusyGuard::new(busy);
        spawn_local(async move {
            let _guard = guard;
            match api_client.edit_page(&id, &page_name, &instruction).await {
                Ok(updated) => {
                    log::info!("AI edit applied to {}", updated.name);
                    on_page_update.run(PageUpdate {
                        website_id: id,
                        page: updated,
                    });
                    // The prompt may have been unmounted by a route change.
                    let _ = prompt.try_set(String::new());
                }
                Err(e) => {
                    log::warn!("AI edit of {page_name} failed: {e}");
                    let _ = error.try_set(Some(format!("Failed to apply changes. ({e})")));
                }
            }
        });
    };

    view! {
        <Card class="mt-6">
            <CardContent class="flex flex-col gap-3">
                <h3 class="text-base font-semibold">"AI Edit"</h3>
                <Label html_for=prompt_id.clone() class="text-muted-foreground">
                    "Describe how this page should change"
                </Label>
                <Textarea
                    id=prompt_id.clone()
                    rows=3
                    placeholder="Make the header sticky and add a footer..."
                    bind_value=prompt
                    disabled=busy
                />

                <div class="flex flex-wrap gap-2">
                    {EDIT_PROMPT_EXAMPLES
                        .into_iter()
                        .map(|example| {
                            view! {
                                <button
                                    type="button"
                                    class="rounded-full bg-muted/50 px-3 py-1 text-xs text-muted-foreground hover:bg-muted"
                                    disabled=move || busy.get()
                                    on:click=move |_| prompt.set(example.to_string())
                                >
                                    {example}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>

                <Notice message=error />

                <Button class="self-end" attr:disabled=move || busy.get() on:click=apply>
                    <Show when=move || busy.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    {move || if busy.get() { "Applying Changes..." } else { "Apply Changes" }}
                </Button>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Website {
        Website {
            id: "w1".to_string(),
            name: Some("Bakery".to_string()),
            description: None,
            pages: vec![
                Page {
                    name: "Home".to_string(),
                    slug: "home".to_string(),
                    html: "<html></html>".to_string(),
                    description: String::new(),
                },
                Page {
                    name: "About".to_string(),
                    slug: "about".to_string(),
                    html: "<html></html>".to_string(),
                    description: String::new(),
                },
            ],
            created_at: None,
        }
    }

    #[test]
    fn test_find_page_is_case_insensitive() {
        let w = site();
        assert_eq!(find_page(&w, "about").map(|p| p.slug.as_str()), Some("about"));
        assert_eq!(find_page(&w, "HOME").map(|p| p.slug.as_str()), Some("home"));
        assert!(find_page(&w, "Contact").is_none());
    }

    #[test]
    fn test_page_update_applies_to_matching_website() {
        let mut loaded = Some(site());
        let mut about = site().pages[1].clone();
        about.html = "<html><body>edited</body></html>".to_string();

        let applied = apply_page_update(
            &mut loaded,
            PageUpdate {
                website_id: "w1".to_string(),
                page: about,
            },
        );

        assert_eq!(applied.as_deref(), Some("About"));
        let pages = &loaded.as_ref().expect("website").pages;
        assert_eq!(pages[1].html, "<html><body>edited</body></html>");
        assert_eq!(pages[0], site().pages[0]);
    }

    #[test]
    fn test_page_update_from_another_website_is_dropped() {
        let mut other = site();
        other.id = "w2".to_string();
        let mut loaded = Some(other.clone());

        let mut home = site().pages[0].clone();
        home.html = "<html><body>from w1</body></html>".to_string();
        let update = PageUpdate {
            website_id: "w1".to_string(),
            page: home,
        };

        assert!(apply_page_update(&mut loaded, update.clone()).is_none());
        assert_eq!(loaded, Some(other));

        let mut nothing_loaded = None;
        assert!(apply_page_update(&mut nothing_loaded, update).is_none());
    }

    #[test]
    fn test_page_description_in_header() {
        let mut page = site().pages[0].clone();
        assert_eq!(page_description(&page), None);
        page.description = "   ".to_string();
        assert_eq!(page_description(&page), None);
        page.description = " Welcome page for the bakery ".to_string();
        assert_eq!(page_description(&page).as_deref(), Some("Welcome page for the bakery"));
    }

    #[test]
    fn test_pages_generated_label() {
        assert_eq!(pages_generated_label(0), "0 pages generated");
        assert_eq!(pages_generated_label(1), "1 page generated");
        assert_eq!(pages_generated_label(3), "3 pages generated");
    }

    #[test]
    fn test_edit_examples_are_not_blank() {
        assert!(EDIT_PROMPT_EXAMPLES.iter().all(|p| non_blank(p).is_some()));
    }
}
