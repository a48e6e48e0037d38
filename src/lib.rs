mod api;
mod app;
mod components;
mod editor;
mod markup;
mod models;
mod pages;
mod preview;
mod state;
mod util;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;


// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    mount_to_body(app::App);
}

#[cfg(test)]
mod tests {
    use crate::api::ApiClient;
    use crate::markup::Document;

    const WEBSITE_JSON: &str = r#"{
        "website": {
            "id": "w-42",
            "name": "Mindful Minutes",
            "description": "A mindfulness coach",
            "pages": [
                {"name": "Home", "slug": "home", "html": "<h1>Welcome</h1><p>Breathe.</p>"},
                {"name": "About", "slug": "about", "html": "<!DOCTYPE html><html><head></head><body><h2>About</h2></body></html>"}
            ],
            "created_at": "2025-01-01T00:00:00Z"
        }
    }"#;

    #[test]
    fn test_loaded_pages_are_complete_documents() {
        let data: serde_json::Value = serde_json::from_str(WEBSITE_JSON).expect("json");
        let site = ApiClient::parse_website_response(data).expect("website should parse");

        assert_eq!(site.pages.len(), 2);
        for page in &site.pages {
            assert!(Document::parse(&page.html).has_explicit_root(), "{}", page.name);
        }
        assert_eq!(
            site.pages[0].html,
            "<html><head></head><body><h1>Welcome</h1><p>Breathe.</p></body></html>"
        );
    }

    #[test]
    fn test_edited_page_replaces_its_slot_only() {
        let data: serde_json::Value = serde_json::from_str(WEBSITE_JSON).expect("json");
        let mut site = ApiClient::parse_website_response(data).expect("website should parse");
        let about_before = site.pages[1].clone();

        let mut doc = Document::parse(&site.pages[0].html);
        let h1 = doc.elements_by_tag("h1")[0];
        doc.set_text_content(h1, "Hello World");
        let updated = site.pages[0].with_html(doc.to_html());

        assert!(site.replace_page(updated));
        assert!(site.pages[0].html.contains("<h1>Hello World</h1>"));
        assert!(site.pages[0].html.contains("<p>Breathe.</p>"));
        assert_eq!(site.pages[1], about_before);
    }
}
