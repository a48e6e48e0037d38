use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

pub(super) const FIELD_CLASS: &str = "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs transition-[color,box-shadow] outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2";

#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(optional)] autofocus: bool,

    // Manual two-way wiring rather than `bind:value`, which has moved
    // between Leptos releases.
    #[prop(into)] bind_value: RwSignal<String>,

    /// Enter key; used by inline editors to commit.
    #[prop(optional)] on_enter: Option<Callback<()>>,
    /// Escape key; used by inline editors to cancel.
    #[prop(optional)] on_escape: Option<Callback<()>>,
) -> impl IntoView {
    let merged_class = tw_merge!("flex h-9", FIELD_CLASS, class);

    let on_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                bind_value.set(input.value());
            }
        }
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "Enter" => {
            if let Some(cb) = on_enter {
                ev.prevent_default();
                cb.run(());
            }
        }
        "Escape" => {
            if let Some(cb) = on_escape {
                ev.prevent_default();
                cb.run(());
            }
        }
        _ => {}
    };

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            id=id
            disabled=move || disabled.get()
            autofocus=autofocus
            prop:value=move || bind_value.get()
            on:input=on_input
            on:keydown=on_keydown
        />
    }
}
