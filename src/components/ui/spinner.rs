use icons::Loader;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <Loader class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Covers its positioned parent while `when` is true.
#[component]
pub fn SpinnerOverlay(#[prop(into)] when: Signal<bool>) -> impl IntoView {
    view! {
        <Show when=move || when.get() fallback=|| ().into_view()>
            <div class="absolute inset-0 z-10 flex items-center justify-center bg-background/80">
                <Spinner class="size-6 text-indigo-500" />
            </div>
        </Show>
    }
}
