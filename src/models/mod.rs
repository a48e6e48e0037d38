use crate::editor::scrub_html;
use crate::markup::ensure_document;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum::{AsRefStr, Display, EnumIter};

/// One generated page. `html` is the canonical content and always holds a
/// complete document once it has passed through [`Page::normalized`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Page {
    pub name: String,
    pub slug: String,
    pub html: String,
    #[serde(default)]
    pub description: String,
}

impl Page {
    /// Wraps fragment HTML from the backend into a full document and drops any
    /// editor decoration a previous save leaked into it.
    pub fn normalized(mut self) -> Self {
        if let Cow::Owned(full) = ensure_document(&self.html) {
            self.html = full;
        }
        if let Cow::Owned(clean) = scrub_html(&self.html) {
            self.html = clean;
        }
        self
    }

    /// Same page identity with new content.
    pub fn with_html(&self, html: String) -> Self {
        Self {
            html,
            ..self.clone()
        }
    }

    pub fn is_same_page(&self, other: &Page) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Website {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Website {
    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// Name for listings: the site name, else its first page, else the id.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.first_page().map(|p| p.name.as_str()))
            .unwrap_or(&self.id)
            .to_string()
    }

    /// Replaces the page with the same name (case-insensitive). Returns false
    /// when no such page exists; the website is left unchanged.
    pub fn replace_page(&mut self, page: Page) -> bool {
        match self.pages.iter_mut().find(|p| p.is_same_page(&page)) {
            Some(slot) => {
                *slot = page;
                true
            }
            None => false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.pages = self.pages.into_iter().map(Page::normalized).collect();
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    /// CSS width and height of the preview frame.
    pub fn dimensions(self) -> (&'static str, &'static str) {
        match self {
            Viewport::Desktop => ("100%", "600px"),
            Viewport::Tablet => ("768px", "1024px"),
            Viewport::Mobile => ("375px", "667px"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Viewport::Desktop => "Desktop",
            Viewport::Tablet => "Tablet",
            Viewport::Mobile => "Mobile",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn page(name: &str, html: &str) -> Page {
        Page {
            name: name.to_string(),
            slug: name.to_lowercase(),
            html: html.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_page_description_defaults_to_empty() {
        let json = r#"{"name":"Home","slug":"home","html":"<html></html>"}"#;
        let parsed: Page = serde_json::from_str(json).expect("page should parse");
        assert_eq!(parsed.description, "");
    }

    #[test]
    fn test_page_normalized_wraps_fragments() {
        let p = page("Home", "<h1>Hi</h1>").normalized();
        assert_eq!(p.html, "<html><head></head><body><h1>Hi</h1></body></html>");

        let full = "<!DOCTYPE html><html><body><h1>Hi</h1></body></html>";
        assert_eq!(page("Home", full).normalized().html, full);
    }

    #[test]
    fn test_page_normalized_drops_leaked_editor_classes() {
        let p = page(
            "Home",
            "<html><body><h1 class=\"visual-editor-selected\">Hi</h1></body></html>",
        )
        .normalized();
        assert_eq!(p.html, "<html><body><h1>Hi</h1></body></html>");
    }

    #[test]
    fn test_with_html_keeps_identity() {
        let p = page("About", "<html></html>");
        let next = p.with_html("<html><body>x</body></html>".to_string());
        assert_eq!(next.name, "About");
        assert_eq!(next.slug, "about");
        assert!(next.is_same_page(&p));
        assert_ne!(next, p);
    }

    #[test]
    fn test_replace_page_by_name() {
        let mut site = Website {
            id: "w1".to_string(),
            name: None,
            description: None,
            pages: vec![page("Home", "a"), page("About", "b")],
            created_at: None,
        };
        assert!(site.replace_page(page("about", "c")));
        assert_eq!(site.pages[1].html, "c");
        assert!(!site.replace_page(page("Contact", "d")));
        assert_eq!(site.pages.len(), 2);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut site = Website {
            id: "w1".to_string(),
            name: Some("  ".to_string()),
            description: None,
            pages: vec![page("Home", "a")],
            created_at: None,
        };
        assert_eq!(site.display_name(), "Home");
        site.pages.clear();
        assert_eq!(site.display_name(), "w1");
        site.name = Some("Bakery".to_string());
        assert_eq!(site.display_name(), "Bakery");
    }

    #[test]
    fn test_viewport_presets() {
        let all: Vec<Viewport> = Viewport::iter().collect();
        assert_eq!(all, vec![Viewport::Desktop, Viewport::Tablet, Viewport::Mobile]);
        assert_eq!(Viewport::Mobile.to_string(), "mobile");
        assert_eq!(Viewport::Tablet.dimensions(), ("768px", "1024px"));
        assert_eq!(Viewport::default().dimensions(), ("100%", "600px"));
    }
}
