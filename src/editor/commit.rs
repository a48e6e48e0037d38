use super::overlay::{Overlay, Selection};
use super::surface::EditSurface;

/// Writes the working copies into the live document and flattens it back to
/// markup.
///
/// Decoration is always stripped right before serialization, so the returned
/// string never carries hover/selection classes or the injected style block.
/// A selection whose node has left the document is a no-op.
pub(crate) fn commit<S: EditSurface>(
    surface: &mut S,
    overlay: &mut Overlay,
    selection: &Selection<S::Node>,
) -> Option<String> {
    if !surface.is_attached(&selection.node) {
        log::warn!("save skipped: selected element is no longer in the document");
        return None;
    }

    surface.set_text(&selection.node, &selection.text);
    if let Some(style) = &selection.style {
        surface.set_inline_style(&selection.node, style);
    }

    overlay.detach(surface);
    Some(surface.serialize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::overlay::{OverlayEvent, SELECTED_CLASS};
    use crate::editor::surface::MarkupSurface;

    #[test]
    fn writes_text_and_strips_decoration() {
        let mut surface = MarkupSurface::parse(
            "<html><head></head><body><h1>Hello</h1><p>Body</p></body></html>",
        );
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        let h1 = surface.candidates()[0];
        let mut sel = overlay
            .handle(&mut surface, OverlayEvent::Click(h1))
            .expect("selected");
        sel.text = "Goodbye".to_string();

        let html = commit(&mut surface, &mut overlay, &sel).expect("committed");

        assert_eq!(
            html,
            "<html><head></head><body><h1>Goodbye</h1><p>Body</p></body></html>"
        );
        assert!(!html.contains("Hello"));
        assert!(!html.contains(SELECTED_CLASS));
        assert!(!html.contains("visual-editor"));
    }

    #[test]
    fn writes_style_when_present() {
        let mut surface = MarkupSurface::parse("<html><body><p>x</p></body></html>");
        let mut overlay = Overlay::default();
        overlay.attach(&mut surface);
        let p = surface.candidates()[0];
        let mut sel = overlay
            .handle(&mut surface, OverlayEvent::Click(p))
            .expect("selected");
        sel.style = Some("color: blue".to_string());

        let html = commit(&mut surface, &mut overlay, &sel).expect("committed");
        assert!(html.contains("<p style=\"color: blue\">x</p>"));
    }

    #[test]
    fn escapes_markup_in_text() {
        let mut surface = MarkupSurface::parse("<html><body><p>x</p></body></html>");
        let mut overlay = Overlay::default();
        let p = surface.candidates()[0];
        let sel = Selection {
            node: p,
            text: "<b>bold</b> & more".to_string(),
            style: None,
        };

        let html = commit(&mut surface, &mut overlay, &sel).expect("committed");
        assert!(html.contains("<p>&lt;b&gt;bold&lt;/b&gt; &amp; more</p>"));
    }

    #[test]
    fn detached_node_is_not_written() {
        let mut surface =
            MarkupSurface::parse("<html><body><div><p>Hello</p></div></body></html>");
        let mut overlay = Overlay::default();
        let p = surface
            .document()
            .elements_by_tag("p")
            .first()
            .copied()
            .expect("p");
        let div = surface.document().parent(p).expect("div");
        surface.document_mut().detach(div);
        let before = surface.serialize();

        let sel = Selection {
            node: p,
            text: "Goodbye".to_string(),
            style: None,
        };
        assert!(commit(&mut surface, &mut overlay, &sel).is_none());
        assert_eq!(surface.serialize(), before);
    }
}
