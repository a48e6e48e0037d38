use super::surface::{EditSurface, MarkupSurface};
use std::borrow::Cow;

pub(crate) const HOVER_CLASS: &str = "visual-editor-hover";
pub(crate) const SELECTED_CLASS: &str = "visual-editor-selected";
pub(crate) const STYLE_ID: &str = "visual-editor-style";

const OVERLAY_CSS: &str = "
.visual-editor-hover {
  outline: 2px dashed #3b82f6 !important;
  cursor: pointer !important;
}
.visual-editor-selected {
  outline: 2px solid #3b82f6 !important;
  background-color: rgba(59, 130, 246, 0.1) !important;
}
";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum OverlayEvent<N> {
    Enter(N),
    Leave(N),
    Click(N),
}

/// An element picked by a click, with the values the edit session starts from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Selection<N> {
    pub node: N,
    pub text: String,
    pub style: Option<String>,
}

/// Hover/selection affordances on the candidate elements of a surface.
///
/// Holding the overlay attached is a lease: it is only taken while edit mode is
/// on and the document has loaded, and every boundary crossing (mode off,
/// content change, commit, teardown) releases it through [`Overlay::detach`].
#[derive(Debug, Default)]
pub(crate) struct Overlay {
    attached: bool,
}

impl Overlay {
    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Resets any previous decoration, then binds every current candidate.
    /// Returns how many elements became interactive.
    pub fn attach<S: EditSurface>(&mut self, surface: &mut S) -> usize {
        self.detach(surface);

        let candidates = surface.candidates();
        for node in &candidates {
            surface.bind(node);
        }
        surface.inject_style(STYLE_ID, OVERLAY_CSS);
        self.attached = true;

        log::debug!("overlay attached to {} elements", candidates.len());
        candidates.len()
    }

    /// Removes listeners, highlight classes and the injected style block.
    /// Safe to call when nothing is attached.
    pub fn detach<S: EditSurface>(&mut self, surface: &mut S) {
        surface.unbind_all();
        strip_decoration(surface);
        if self.attached {
            log::debug!("overlay detached");
        }
        self.attached = false;
    }

    /// Applies one listener event. A click yields the new selection.
    pub fn handle<S: EditSurface>(
        &mut self,
        surface: &mut S,
        event: OverlayEvent<S::Node>,
    ) -> Option<Selection<S::Node>> {
        if !self.attached {
            return None;
        }

        match event {
            OverlayEvent::Enter(node) => {
                surface.add_class(&node, HOVER_CLASS);
                None
            }
            OverlayEvent::Leave(node) => {
                surface.remove_class(&node, HOVER_CLASS);
                None
            }
            OverlayEvent::Click(node) => {
                for prev in surface.with_class(SELECTED_CLASS) {
                    surface.remove_class(&prev, SELECTED_CLASS);
                }
                surface.add_class(&node, SELECTED_CLASS);
                Some(Selection {
                    text: surface.text(&node),
                    style: surface.inline_style(&node),
                    node,
                })
            }
        }
    }
}

/// Removes every editor-only decoration from the document, whether this
/// overlay put it there or it arrived inside the page HTML.
pub(crate) fn strip_decoration<S: EditSurface>(surface: &mut S) {
    for class in [HOVER_CLASS, SELECTED_CLASS] {
        for node in surface.with_class(class) {
            surface.remove_class(&node, class);
        }
    }
    surface.remove_style(STYLE_ID);
}

/// `html` with any editor decoration removed. Markers can only arrive from a
/// page saved by a client that never detached; clean input is borrowed as is.
pub(crate) fn scrub_html(html: &str) -> Cow<'_, str> {
    if ![HOVER_CLASS, SELECTED_CLASS, STYLE_ID]
        .iter()
        .any(|marker| html.contains(marker))
    {
        return Cow::Borrowed(html);
    }

    let mut surface = MarkupSurface::parse(html);
    strip_decoration(&mut surface);
    log::debug!("scrubbed editor decoration from page html");
    Cow::Owned(surface.serialize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html><html><head><title>Bakery</title></head><body><header><h1>Fresh bread</h1><nav><a href=\"/menu\">Menu</a></nav></header><main><p>Baked <span>daily</span>.</p><div></div><section contenteditable=\"true\">Notes</section><img src=\"x.png\"></main></body></html>";

    fn decorated(surface: &MarkupSurface) -> usize {
        surface.with_class(HOVER_CLASS).len() + surface.with_class(SELECTED_CLASS).len()
    }

    #[test]
    fn candidates_are_structural() {
        let surface = MarkupSurface::parse(PAGE);
        let tags: Vec<&str> = surface
            .candidates()
            .iter()
            .filter_map(|id| surface.document().tag(*id))
            .collect();
        assert_eq!(tags, vec!["h1", "a", "p", "span", "div", "section"]);
    }

    #[test]
    fn attach_detach_attach_matches_single_attach() {
        let mut once = MarkupSurface::parse(PAGE);
        let mut overlay = Overlay::default();
        overlay.attach(&mut once);

        let mut thrice = MarkupSurface::parse(PAGE);
        let mut overlay2 = Overlay::default();
        overlay2.attach(&mut thrice);
        overlay2.detach(&mut thrice);
        overlay2.attach(&mut thrice);
        overlay2.attach(&mut thrice);

        assert_eq!(once.bound(), thrice.bound());
        assert_eq!(thrice.document().elements_by_id(STYLE_ID).len(), 1);
        assert_eq!(once.serialize(), thrice.serialize());
    }

    #[test]
    fn at_most_one_element_is_selected() {
        let mut surface = MarkupSurface::parse(PAGE);
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);

        for node in surface.candidates().into_iter().chain(surface.candidates()) {
            overlay.handle(&mut surface, OverlayEvent::Click(node));
            assert_eq!(surface.with_class(SELECTED_CLASS), vec![node]);
        }
    }

    #[test]
    fn click_publishes_text_and_style() {
        let mut surface =
            MarkupSurface::parse("<html><body><p style=\"color: red\">Hi &amp; bye</p></body></html>");
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        let p = surface.candidates()[0];

        let sel = overlay
            .handle(&mut surface, OverlayEvent::Click(p))
            .expect("click selects");
        assert_eq!(sel.node, p);
        assert_eq!(sel.text, "Hi & bye");
        assert_eq!(sel.style.as_deref(), Some("color: red"));
    }

    #[test]
    fn hover_toggles_class() {
        let mut surface = MarkupSurface::parse(PAGE);
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        let h1 = surface.candidates()[0];

        overlay.handle(&mut surface, OverlayEvent::Enter(h1));
        assert!(surface.document().has_class(h1, HOVER_CLASS));
        overlay.handle(&mut surface, OverlayEvent::Leave(h1));
        assert!(!surface.document().has_class(h1, HOVER_CLASS));
    }

    #[test]
    fn detach_leaves_no_residue() {
        let mut surface = MarkupSurface::parse(PAGE);
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        let nodes = surface.candidates();
        overlay.handle(&mut surface, OverlayEvent::Enter(nodes[0]));
        overlay.handle(&mut surface, OverlayEvent::Enter(nodes[2]));
        overlay.handle(&mut surface, OverlayEvent::Click(nodes[3]));

        overlay.detach(&mut surface);

        assert!(!overlay.is_attached());
        assert_eq!(decorated(&surface), 0);
        assert_eq!(surface.bound_count(), 0);
        assert!(surface.document().elements_by_id(STYLE_ID).is_empty());
        assert_eq!(surface.serialize(), MarkupSurface::parse(PAGE).serialize());
    }

    #[test]
    fn events_while_detached_are_ignored() {
        let mut surface = MarkupSurface::parse(PAGE);
        let mut overlay = Overlay::default();
        let h1 = surface.candidates()[0];
        assert!(overlay
            .handle(&mut surface, OverlayEvent::Click(h1))
            .is_none());
        assert_eq!(decorated(&surface), 0);
    }

    #[test]
    fn leaked_markers_in_page_html_are_stripped_on_attach() {
        let mut surface = MarkupSurface::parse(
            "<html><head><style id=\"visual-editor-style\">x</style></head><body><h1 class=\"visual-editor-selected big\">x</h1></body></html>",
        );
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        overlay.detach(&mut surface);
        assert_eq!(
            surface.serialize(),
            "<html><head></head><body><h1 class=\"big\">x</h1></body></html>"
        );
    }

    #[test]
    fn scrub_borrows_clean_html_and_cleans_leaked_markers() {
        assert!(matches!(scrub_html(PAGE), Cow::Borrowed(_)));

        let leaked = "<!DOCTYPE html><html><head><style id=\"visual-editor-style\">x</style></head><body><p class=\"visual-editor-hover\">Hi</p></body></html>";
        assert_eq!(
            scrub_html(leaked),
            "<!DOCTYPE html><html><head></head><body><p>Hi</p></body></html>"
        );
    }
}
