use super::frame::{Dispatch, FrameSurface};
use super::overlay::{Overlay, OverlayEvent};
use super::session::EditSession;
use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Label, Notice, NoticeTone};
use crate::models::{Page, Viewport};
use crate::preview::RenderFrame;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// What the frame currently shows. A change means any selection points into a
/// document that is about to be replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ContentKey {
    name: String,
    html: String,
}

impl ContentKey {
    fn of(page: &Page) -> Self {
        Self {
            name: page.name.clone(),
            html: page.html.clone(),
        }
    }
}

/// Everything that touches the live frame document. Lives in a local
/// `StoredValue`; signals only mirror what the toolbar needs to render.
#[derive(Default)]
struct LiveEditor {
    surface: Option<FrameSurface>,
    overlay: Overlay,
    session: EditSession<Element>,
}

impl LiveEditor {
    fn attach(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            self.overlay.attach(surface);
        }
    }

    /// Edit mode off or teardown: drop the selection and all decoration.
    fn release(&mut self) {
        match self.surface.as_mut() {
            Some(surface) => {
                self.session.cancel(surface);
                self.overlay.detach(surface);
            }
            None => self.session.reset(),
        }
    }

    /// Content replaced underneath us: never write through the old selection.
    fn reset(&mut self) {
        self.session.reset();
        if let Some(surface) = self.surface.as_mut() {
            self.overlay.detach(surface);
        }
    }

    fn replace_surface(&mut self, next: Option<FrameSurface>) {
        self.reset();
        self.surface = next;
    }

    fn save(&mut self, text: String, style: String, keep_editing: bool) -> Option<String> {
        let Some(surface) = self.surface.as_mut() else {
            self.session.reset();
            return None;
        };

        let had_style = self
            .session
            .selection()
            .is_some_and(|sel| sel.style.is_some());
        self.session.set_text(text);
        if had_style || !style.trim().is_empty() {
            self.session.set_style(style);
        }

        let html = self.session.save(surface, &mut self.overlay);
        if keep_editing {
            self.overlay.attach(surface);
        }
        html
    }

    fn cancel(&mut self) {
        match self.surface.as_mut() {
            Some(surface) => self.session.cancel(surface),
            None => self.session.reset(),
        }
    }
}

/// Point-and-click text editing inside the rendered page.
///
/// `on_page_update` runs exactly once per successful save, with the same page
/// and the re-serialized document as its new HTML.
#[component]
pub fn VisualEditor(
    #[prop(into)] page: Signal<Page>,
    #[prop(into)] viewport: Signal<Viewport>,
    on_page_update: Callback<Page>,
) -> impl IntoView {
    let edit_mode: RwSignal<bool> = RwSignal::new(false);
    let unavailable: RwSignal<bool> = RwSignal::new(false);
    let selected: RwSignal<bool> = RwSignal::new(false);
    let edit_text: RwSignal<String> = RwSignal::new(String::new());
    let edit_style: RwSignal<String> = RwSignal::new(String::new());

    let frame_ref: NodeRef<html::Iframe> = NodeRef::new();
    let live = StoredValue::new_local(LiveEditor::default());

    let text_id = use_random_id_for("edit_text");
    let style_id = use_random_id_for("edit_style");

    let on_event = move |ev: OverlayEvent<Element>| {
        let picked = live
            .try_update_value(|l| {
                let surface = l.surface.as_mut()?;
                let sel = l.overlay.handle(surface, ev)?;
                l.session.select(sel.clone());
                Some(sel)
            })
            .flatten();
        if let Some(sel) = picked {
            edit_text.set(sel.text);
            edit_style.set(sel.style.unwrap_or_default());
            selected.set(true);
        }
    };

    let on_load = Callback::new(move |_: ()| {
        let dispatch: Dispatch = Rc::new(on_event);
        let surface = frame_ref
            .get_untracked()
            .and_then(|frame| FrameSurface::from_frame(&frame, dispatch));
        if surface.is_none() {
            log::warn!("frame document unavailable; visual editing disabled");
        }
        unavailable.set(surface.is_none());

        let mode = edit_mode.get_untracked();
        live.update_value(|l| {
            l.replace_surface(surface);
            if mode {
                l.attach();
            }
        });
        selected.set(false);
    });

    // Overlay lease follows edit mode.
    Effect::new(move |_| {
        let on = edit_mode.get();
        live.update_value(|l| if on { l.attach() } else { l.release() });
        if !on {
            selected.set(false);
        }
    });

    // New content (another page, an AI edit, our own save) invalidates any
    // selection before the frame reloads.
    Effect::new(move |prev: Option<ContentKey>| {
        let key = page.with(ContentKey::of);
        if prev.is_some_and(|k| k != key) {
            live.update_value(LiveEditor::reset);
            selected.set(false);
        }
        key
    });

    on_cleanup(move || {
        live.try_update_value(|l| {
            l.release();
            l.surface = None;
        });
    });

    let save = move || {
        let text = edit_text.get_untracked();
        let style = edit_style.get_untracked();
        let keep_editing = edit_mode.get_untracked();
        let html = live
            .try_update_value(|l| l.save(text, style, keep_editing))
            .flatten();
        selected.set(false);

        if let Some(html) = html {
            log::info!("visual edit saved ({} bytes)", html.len());
            on_page_update.run(page.with_untracked(|p| p.with_html(html)));
        }
    };

    let cancel = move || {
        live.update_value(LiveEditor::cancel);
        selected.set(false);
    };

    // Escape on the host page leaves edit mode. Inside the toolbar inputs it
    // cancels the selection instead.
    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() != "Escape" || !edit_mode.get_untracked() || selected.get_untracked() {
            return;
        }
        let in_field = ev
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| matches!(el.tag_name().to_lowercase().as_str(), "input" | "textarea"));
        if !in_field {
            edit_mode.set(false);
        }
    });
    on_cleanup(move || key_handle.remove());

    let html = Signal::derive(move || page.with(|p| p.html.clone()));
    let title = Signal::derive(move || page.with(|p| format!("Visual Editor for {} page", p.name)));

    view! {
        <div class="relative">
            <div class="border-b border-blue-200 bg-blue-50 px-4 py-2">
                <div class="flex flex-wrap items-center justify-between gap-2">
                    <div class="text-sm text-blue-700">
                        <Show
                            when=move || edit_mode.get()
                            fallback=|| view! { "Enter edit mode, then click any text element to change it." }
                        >
                            <strong>"Visual Editor Mode:"</strong>
                            " Click on any text element to edit it"
                        </Show>
                    </div>

                    <div class="flex items-center gap-2">
                        <Show when=move || selected.get() fallback=|| ().into_view()>
                            <Label html_for=text_id.clone() class="sr-only">"Text"</Label>
                            <Input
                                id=text_id.clone()
                                bind_value=edit_text
                                autofocus=true
                                placeholder="Text"
                                class="h-8 w-56 text-sm"
                                on_enter=Callback::new(move |_: ()| save())
                                on_escape=Callback::new(move |_: ()| cancel())
                            />
                            <Label html_for=style_id.clone() class="sr-only">"Inline style"</Label>
                            <Input
                                id=style_id.clone()
                                bind_value=edit_style
                                placeholder="Inline style (optional)"
                                class="h-8 w-48 font-mono text-xs"
                                on_enter=Callback::new(move |_: ()| save())
                                on_escape=Callback::new(move |_: ()| cancel())
                            />
                            <Button
                                variant=ButtonVariant::Success
                                size=ButtonSize::Sm
                                on:click=move |_| save()
                            >
                                "Save"
                            </Button>
                            <Button
                                variant=ButtonVariant::Secondary
                                size=ButtonSize::Sm
                                on:click=move |_| cancel()
                            >
                                "Cancel"
                            </Button>
                        </Show>

                        <Button
                            variant=ButtonVariant::Edit
                            size=ButtonSize::Sm
                            attr:disabled=move || unavailable.get()
                            on:click=move |_| edit_mode.update(|m| *m = !*m)
                        >
                            {move || if edit_mode.get() { "Exit Edit Mode" } else { "Enter Edit Mode" }}
                        </Button>
                    </div>
                </div>

                <Notice
                    tone=NoticeTone::Info
                    class="mt-2"
                    message=Signal::derive(move || {
                        unavailable.get().then(|| "Editing is unavailable for this page.".to_string())
                    })
                />
            </div>

            <div class="border border-gray-200 bg-white">
                <RenderFrame
                    html=html
                    viewport=viewport
                    title=title
                    node_ref=frame_ref
                    on_load=on_load
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(name: &str, html: &str) -> Page {
        Page {
            name: name.to_string(),
            slug: name.to_lowercase(),
            html: html.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn content_key_changes_with_page_or_markup() {
        let home = page("Home", "<html><body><h1>Hi</h1></body></html>");
        assert_eq!(
            ContentKey::of(&home),
            ContentKey::of(&page("Home", "<html><body><h1>Hi</h1></body></html>"))
        );
        assert_ne!(
            ContentKey::of(&home),
            ContentKey::of(&home.with_html("<html><body><h1>Yo</h1></body></html>".to_string()))
        );
        assert_ne!(
            ContentKey::of(&home),
            ContentKey::of(&page("About", &home.html))
        );
    }

    #[test]
    fn content_key_ignores_metadata_only_changes() {
        let home = page("Home", "<html></html>");
        let mut described = home.clone();
        described.description = "Landing".to_string();
        assert_eq!(ContentKey::of(&home), ContentKey::of(&described));
    }
}
