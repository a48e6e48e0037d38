use crate::components::ui::{Button, ButtonSize, ButtonVariant, SpinnerOverlay};
use crate::editor::NavigationGuard;
use crate::markup::ensure_document;
use crate::models::{Page, Viewport};
use leptos::html;
use leptos::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Scripts never run inside generated pages; same-origin access remains so the
/// host can read and edit the frame document.
pub(crate) const FRAME_SANDBOX: &str = "allow-same-origin";

/// Identity of one rendered frame. Any change re-creates the iframe.
pub(crate) fn frame_key(html: &str, viewport: Viewport, revision: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    html.hash(&mut hasher);
    viewport.hash(&mut hasher);
    revision.hash(&mut hasher);
    hasher.finish()
}

/// Isolated render surface for an untrusted HTML string.
///
/// The frame is rebuilt whenever `html`, `viewport` or `revision` changes, and
/// `on_load` fires once its document is ready.
#[component]
pub fn RenderFrame(
    #[prop(into)] html: Signal<String>,
    #[prop(into)] viewport: Signal<Viewport>,
    #[prop(into)] title: Signal<String>,
    #[prop(into, optional)] revision: Signal<u64>,
    #[prop(optional)] node_ref: NodeRef<html::Iframe>,
    #[prop(optional)] on_load: Option<Callback<()>>,
) -> impl IntoView {
    let guard = StoredValue::new_local(None::<NavigationGuard>);

    let handle_load = move |_: web_sys::Event| {
        let next = node_ref
            .get_untracked()
            .and_then(|frame| frame.content_document())
            .and_then(|doc| NavigationGuard::install(&doc));
        guard.set_value(next);
        if let Some(cb) = on_load {
            cb.run(());
        }
    };

    on_cleanup(move || {
        guard.try_update_value(|g| *g = None);
    });

    move || {
        revision.track();
        let vp = viewport.get();
        let srcdoc = ensure_document(&html.get()).into_owned();
        let (width, height) = vp.dimensions();
        log::debug!("rendering frame ({vp}, {} bytes)", srcdoc.len());

        view! {
            <div
                class="relative mx-auto overflow-hidden bg-white"
                style:width=width
                style:height=height
            >
                <iframe
                    node_ref=node_ref
                    srcdoc=srcdoc
                    sandbox=FRAME_SANDBOX
                    class="h-full w-full border-0"
                    title=move || title.get()
                    aria-label=move || title.get()
                    on:load=handle_load
                />
            </div>
        }
    }
}

/// Read-only preview with a reload control and a loading indicator.
#[component]
pub fn PagePreview(
    #[prop(into)] page: Signal<Page>,
    #[prop(into)] viewport: Signal<Viewport>,
) -> impl IntoView {
    let revision: RwSignal<u64> = RwSignal::new(0);
    let loaded_key: RwSignal<Option<u64>> = RwSignal::new(None);

    let key = Memo::new(move |_| page.with(|p| frame_key(&p.html, viewport.get(), revision.get())));
    let loading = Signal::derive(move || loaded_key.get() != Some(key.get()));

    let on_load = Callback::new(move |_: ()| {
        loaded_key.set(Some(key.get_untracked()));
    });

    let html = Signal::derive(move || page.with(|p| p.html.clone()));
    let title = Signal::derive(move || page.with(|p| format!("Preview of {}", p.name)));

    view! {
        <div class="flex w-full items-center justify-center">
            <div
                class="relative max-w-full overflow-hidden rounded-xl border border-border bg-white shadow dark:bg-muted"
                class:w-full=move || viewport.get() == Viewport::Desktop
            >
                <div class="flex items-center justify-between gap-4 border-b border-border bg-muted/20 px-4 py-2 text-sm font-medium">
                    <span class="truncate">{move || format!("Preview: {}", page.with(|p| p.name.clone()))}</span>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Xs
                        attr:disabled=move || loading.get()
                        on:click=move |_| revision.update(|r| *r += 1)
                    >
                        "Reload"
                    </Button>
                </div>

                <div class="relative">
                    <SpinnerOverlay when=loading />
                    <RenderFrame
                        html=html
                        viewport=viewport
                        title=title
                        revision=revision
                        on_load=on_load
                    />
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_key_changes_with_inputs() {
        let base = frame_key("<html></html>", Viewport::Desktop, 0);
        assert_eq!(base, frame_key("<html></html>", Viewport::Desktop, 0));
        assert_ne!(base, frame_key("<html><body></body></html>", Viewport::Desktop, 0));
        assert_ne!(base, frame_key("<html></html>", Viewport::Mobile, 0));
        assert_ne!(base, frame_key("<html></html>", Viewport::Desktop, 1));
    }

    #[test]
    fn test_sandbox_disallows_scripts_and_navigation() {
        let tokens: Vec<&str> = FRAME_SANDBOX.split_whitespace().collect();
        assert_eq!(tokens, vec!["allow-same-origin"]);
    }
}
