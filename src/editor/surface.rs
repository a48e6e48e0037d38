use crate::markup::{Document, NodeId};

/// Structural candidate set: headings, paragraphs, links, inline text, buttons,
/// generic containers, and anything explicitly marked editable. Empty elements
/// match too.
pub(crate) const CANDIDATE_SELECTOR: &str =
    "h1, h2, h3, h4, h5, h6, p, a, span, button, div, [contenteditable='true']";

const CANDIDATE_TAGS: [&str; 11] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "a", "span", "button", "div",
];

/// The isolated document the overlay and the edit session operate on.
///
/// Implemented by the live frame document in the browser and by the owned
/// [`Document`] tree, so the attach/select/commit protocol is identical in both.
pub(crate) trait EditSurface {
    type Node: Clone + PartialEq;

    /// Fresh query of the candidate set, in document order.
    fn candidates(&self) -> Vec<Self::Node>;
    fn with_class(&self, class: &str) -> Vec<Self::Node>;
    fn add_class(&mut self, node: &Self::Node, class: &str);
    /// Drops the `class` attribute once nothing is left in it.
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&mut self, node: &Self::Node, text: &str);
    fn inline_style(&self, node: &Self::Node) -> Option<String>;
    /// An empty style removes the attribute.
    fn set_inline_style(&mut self, node: &Self::Node, style: &str);
    fn is_attached(&self, node: &Self::Node) -> bool;

    fn inject_style(&mut self, id: &str, css: &str);
    /// Removes every element carrying `id`.
    fn remove_style(&mut self, id: &str);

    /// Installs hover and click listeners on `node`.
    fn bind(&mut self, node: &Self::Node);
    fn unbind_all(&mut self);
    fn bound_count(&self) -> usize;

    /// Doctype plus the document element's outer markup.
    fn serialize(&self) -> String;
}

/// [`EditSurface`] over the owned tree. Listener bookkeeping is recorded per
/// node so tests can observe duplicates and leaks.
#[derive(Clone, Debug)]
pub(crate) struct MarkupSurface {
    doc: Document,
    bound: Vec<NodeId>,
}

impl MarkupSurface {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Document::parse(html),
            bound: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[cfg(test)]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[cfg(test)]
    pub fn bound(&self) -> &[NodeId] {
        &self.bound
    }
}

impl EditSurface for MarkupSurface {
    type Node = NodeId;

    fn candidates(&self) -> Vec<NodeId> {
        self.doc
            .elements()
            .into_iter()
            .filter(|id| {
                self.doc
                    .tag(*id)
                    .is_some_and(|t| CANDIDATE_TAGS.contains(&t))
                    || self.doc.attr(*id, "contenteditable") == Some("true")
            })
            .collect()
    }

    fn with_class(&self, class: &str) -> Vec<NodeId> {
        self.doc
            .elements()
            .into_iter()
            .filter(|id| self.doc.has_class(*id, class))
            .collect()
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        self.doc.add_class(*node, class);
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        self.doc.remove_class(*node, class);
    }

    fn text(&self, node: &NodeId) -> String {
        self.doc.text_content(*node)
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        self.doc.set_text_content(*node, text);
    }

    fn inline_style(&self, node: &NodeId) -> Option<String> {
        self.doc.attr(*node, "style").map(str::to_string)
    }

    fn set_inline_style(&mut self, node: &NodeId, style: &str) {
        if style.trim().is_empty() {
            self.doc.remove_attr(*node, "style");
        } else {
            self.doc.set_attr(*node, "style", style);
        }
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.doc.is_attached(*node)
    }

    fn inject_style(&mut self, id: &str, css: &str) {
        let parent = self.doc.head().unwrap_or(self.doc.root());
        let style = self.doc.create_element("style");
        self.doc.set_attr(style, "id", id);
        self.doc.set_text_content(style, css);
        self.doc.append_child(parent, style);
    }

    fn remove_style(&mut self, id: &str) {
        for node in self.doc.elements_by_id(id) {
            self.doc.detach(node);
        }
    }

    fn bind(&mut self, node: &NodeId) {
        self.bound.push(*node);
    }

    fn unbind_all(&mut self) {
        self.bound.clear();
    }

    fn bound_count(&self) -> usize {
        self.bound.len()
    }

    fn serialize(&self) -> String {
        self.doc.to_html()
    }
}
