use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeTone {
    Info,
    Error,
}

/// Inline, non-fatal notification shown while `message` holds a value.
#[component]
pub fn Notice(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(default = NoticeTone::Error)] tone: NoticeTone,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let (border, text) = match tone {
        NoticeTone::Info => ("border-blue-200 bg-blue-50", "text-blue-700"),
        NoticeTone::Error => ("border-destructive/30", "text-destructive"),
    };
    let alert_class = tw_merge!(border, class);

    view! {
        <Show when=move || message.get().is_some() fallback=|| ().into_view()>
            <Alert class=alert_class.clone() attr:role="alert">
                <AlertDescription class=format!("{text} text-xs")>
                    {move || message.get().unwrap_or_default()}
                </AlertDescription>
            </Alert>
        </Show>
    }
}
