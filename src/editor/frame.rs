use super::overlay::OverlayEvent;
use super::surface::{EditSurface, CANDIDATE_SELECTOR};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlIFrameElement};

/// Receives hover/click events from listeners living inside the frame.
pub(crate) type Dispatch = Rc<dyn Fn(OverlayEvent<Element>)>;

struct Binding {
    element: Element,
    enter: Closure<dyn FnMut(Event)>,
    leave: Closure<dyn FnMut(Event)>,
    click: Closure<dyn FnMut(Event)>,
}

impl Binding {
    fn install(&self) -> Result<(), wasm_bindgen::JsValue> {
        self.element
            .add_event_listener_with_callback("mouseenter", self.enter.as_ref().unchecked_ref())?;
        self.element
            .add_event_listener_with_callback("mouseleave", self.leave.as_ref().unchecked_ref())?;
        self.element
            .add_event_listener_with_callback("click", self.click.as_ref().unchecked_ref())
    }

    fn remove(&self) {
        let _ = self
            .element
            .remove_event_listener_with_callback("mouseenter", self.enter.as_ref().unchecked_ref());
        let _ = self
            .element
            .remove_event_listener_with_callback("mouseleave", self.leave.as_ref().unchecked_ref());
        let _ = self
            .element
            .remove_event_listener_with_callback("click", self.click.as_ref().unchecked_ref());
    }
}

fn listener(
    dispatch: &Dispatch,
    element: &Element,
    event: fn(Element) -> OverlayEvent<Element>,
    swallow: bool,
) -> Closure<dyn FnMut(Event)> {
    let dispatch = Rc::clone(dispatch);
    let element = element.clone();
    Closure::new(move |ev: Event| {
        if swallow {
            ev.prevent_default();
            ev.stop_propagation();
        }
        dispatch(event(element.clone()));
    })
}

/// [`EditSurface`] over the live document of the preview frame.
///
/// Listener closures are owned here and removed explicitly, never leaked, so
/// dropping the surface releases everything it bound.
pub(crate) struct FrameSurface {
    document: Document,
    bindings: Vec<Binding>,
    dispatch: Dispatch,
}

impl FrameSurface {
    pub fn new(document: Document, dispatch: Dispatch) -> Self {
        Self {
            document,
            bindings: Vec::new(),
            dispatch,
        }
    }

    /// `None` when the frame has no accessible document (cross-origin, not
    /// loaded, or nothing parsed). Editing is then unavailable.
    pub fn from_frame(frame: &HtmlIFrameElement, dispatch: Dispatch) -> Option<Self> {
        let document = frame.content_document()?;
        document.document_element()?;
        Some(Self::new(document, dispatch))
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("query {selector:?} failed: {e:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }
}

impl EditSurface for FrameSurface {
    type Node = Element;

    fn candidates(&self) -> Vec<Element> {
        self.query(CANDIDATE_SELECTOR)
    }

    fn with_class(&self, class: &str) -> Vec<Element> {
        self.query(&format!(".{class}"))
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
        if node
            .get_attribute("class")
            .is_some_and(|c| c.trim().is_empty())
        {
            let _ = node.remove_attribute("class");
        }
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inline_style(&self, node: &Element) -> Option<String> {
        node.get_attribute("style")
    }

    fn set_inline_style(&mut self, node: &Element, style: &str) {
        let res = if style.trim().is_empty() {
            node.remove_attribute("style")
        } else {
            node.set_attribute("style", style)
        };
        if let Err(e) = res {
            log::warn!("failed to write inline style: {e:?}");
        }
    }

    fn is_attached(&self, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        self.document.contains(Some(node))
    }

    fn inject_style(&mut self, id: &str, css: &str) {
        let Ok(style) = self.document.create_element("style") else {
            log::warn!("could not create editor style block");
            return;
        };
        style.set_id(id);
        style.set_text_content(Some(css));

        let parent = self
            .document
            .head()
            .map(Element::from)
            .or_else(|| self.document.document_element());
        if let Some(parent) = parent {
            let _ = parent.append_child(&style);
        }
    }

    fn remove_style(&mut self, id: &str) {
        while let Some(el) = self.document.get_element_by_id(id) {
            el.remove();
        }
    }

    fn bind(&mut self, node: &Element) {
        let binding = Binding {
            element: node.clone(),
            enter: listener(&self.dispatch, node, OverlayEvent::Enter, false),
            leave: listener(&self.dispatch, node, OverlayEvent::Leave, false),
            click: listener(&self.dispatch, node, OverlayEvent::Click, true),
        };
        if let Err(e) = binding.install() {
            log::warn!("failed to bind editor listeners: {e:?}");
            binding.remove();
            return;
        }
        self.bindings.push(binding);
    }

    fn unbind_all(&mut self) {
        for binding in self.bindings.drain(..) {
            binding.remove();
        }
    }

    fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    fn serialize(&self) -> String {
        let Some(root) = self.document.document_element() else {
            return String::new();
        };
        let doctype = self
            .document
            .doctype()
            .map(|d| format!("<!DOCTYPE {}>", d.name()))
            .unwrap_or_default();
        format!("{doctype}{}", root.outer_html())
    }
}

impl Drop for FrameSurface {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

/// Whether following `href` would leave the current document.
pub(crate) fn is_navigation(href: &str) -> bool {
    let href = href.trim();
    !(href.is_empty() || href.starts_with('#'))
}

/// Capture-phase listeners that keep link clicks and form submits inside the
/// preview frame from navigating it away. Removed on drop.
pub(crate) struct NavigationGuard {
    document: Document,
    click: Closure<dyn FnMut(Event)>,
    submit: Closure<dyn FnMut(Event)>,
}

impl NavigationGuard {
    pub fn install(document: &Document) -> Option<Self> {
        let click = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            let anchor = ev
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("a[href]").ok().flatten());
            let Some(anchor) = anchor else {
                return;
            };
            if is_navigation(&anchor.get_attribute("href").unwrap_or_default()) {
                ev.prevent_default();
            }
        });
        let submit = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            ev.prevent_default();
        });

        let guard = Self {
            document: document.clone(),
            click,
            submit,
        };
        let installed = guard
            .document
            .add_event_listener_with_callback_and_bool(
                "click",
                guard.click.as_ref().unchecked_ref(),
                true,
            )
            .and_then(|_| {
                guard.document.add_event_listener_with_callback_and_bool(
                    "submit",
                    guard.submit.as_ref().unchecked_ref(),
                    true,
                )
            });
        match installed {
            Ok(()) => Some(guard),
            Err(e) => {
                log::warn!("navigation guard not installed: {e:?}");
                None
            }
        }
    }
}

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        let _ = self.document.remove_event_listener_with_callback_and_bool(
            "click",
            self.click.as_ref().unchecked_ref(),
            true,
        );
        let _ = self.document.remove_event_listener_with_callback_and_bool(
            "submit",
            self.submit.as_ref().unchecked_ref(),
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_links_stay_in_document() {
        assert!(!is_navigation("#pricing"));
        assert!(!is_navigation("  #top"));
        assert!(!is_navigation(""));
    }

    #[test]
    fn other_links_navigate() {
        assert!(is_navigation("/about"));
        assert!(is_navigation("https://example.com"));
        assert!(is_navigation("about.html#team"));
        assert!(is_navigation("javascript:void(0)"));
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::editor::overlay::{Overlay, SELECTED_CLASS, STYLE_ID};
    use crate::editor::session::EditSession;
    use std::cell::RefCell;
    use wasm_bindgen_test::*;
    use web_sys::{DomParser, SupportedType};

    wasm_bindgen_test_configure!(run_in_browser);

    const PAGE: &str = "<!DOCTYPE html><html><head><title>t</title></head><body><h1>Hello</h1><p>Some <span>text</span></p><a href=\"/x\">link</a></body></html>";

    fn parse(html: &str) -> Document {
        DomParser::new()
            .and_then(|p| p.parse_from_string(html, SupportedType::TextHtml))
            .expect("DOMParser should parse")
    }

    fn surface(html: &str) -> FrameSurface {
        FrameSurface::new(parse(html), Rc::new(|_| {}))
    }

    #[wasm_bindgen_test]
    fn test_reattach_does_not_duplicate() {
        let mut s = surface(PAGE);
        let mut overlay = Overlay::default();
        let first = overlay.attach(&mut s);
        overlay.detach(&mut s);
        overlay.attach(&mut s);
        let again = overlay.attach(&mut s);

        assert_eq!(first, again);
        assert_eq!(s.bound_count(), first);
        assert_eq!(s.query(&format!("#{STYLE_ID}")).len(), 1);
    }

    #[wasm_bindgen_test]
    fn test_detach_leaves_no_residue() {
        let mut s = surface(PAGE);
        let before = s.serialize();
        let mut overlay = Overlay::default();
        overlay.attach(&mut s);
        let nodes = s.candidates();
        overlay.handle(&mut s, OverlayEvent::Enter(nodes[0].clone()));
        overlay.handle(&mut s, OverlayEvent::Click(nodes[1].clone()));

        overlay.detach(&mut s);

        assert_eq!(s.bound_count(), 0);
        assert!(s.with_class(SELECTED_CLASS).is_empty());
        assert!(s.document().get_element_by_id(STYLE_ID).is_none());
        assert_eq!(s.serialize(), before);
    }

    #[wasm_bindgen_test]
    fn test_save_round_trip() {
        let mut s = surface(PAGE);
        let mut overlay = Overlay::default();
        let mut session = EditSession::default();
        overlay.attach(&mut s);
        let h1 = s.candidates()[0].clone();

        let sel = overlay
            .handle(&mut s, OverlayEvent::Click(h1))
            .expect("click selects");
        session.select(sel);
        session.set_text("Goodbye");
        let html = session.save(&mut s, &mut overlay).expect("saved");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Goodbye</h1>"));
        assert!(!html.contains("Hello"));
        assert!(!html.contains("visual-editor"));
    }

    #[wasm_bindgen_test]
    fn test_dom_click_dispatches_selection() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut s = FrameSurface::new(
            parse(PAGE),
            Rc::new(move |ev| {
                if let OverlayEvent::Click(el) = ev {
                    sink.borrow_mut().push(el.tag_name());
                }
            }),
        );
        let mut overlay = Overlay::default();
        overlay.attach(&mut s);

        let span = s.query("span").remove(0);
        let html: web_sys::HtmlElement = span.unchecked_into();
        html.click();
        assert_eq!(*seen.borrow(), vec!["SPAN".to_string()]);

        overlay.detach(&mut s);
        html.click();
        assert_eq!(seen.borrow().len(), 1);
    }
}
