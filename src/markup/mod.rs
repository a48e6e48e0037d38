//! Owned HTML tree: parse → mutate → unparse.
//!
//! Generated pages are untrusted strings. This tree gives us a document model we
//! control, so the "always a complete document" invariant and the visual editor's
//! serialization rules can be enforced and tested without a live browser.

mod parse;
mod serialize;

use std::borrow::Cow;

pub(crate) type NodeId = usize;

/// Elements that never have children or an end tag.
pub(crate) const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is kept verbatim (no entity handling, no child tags).
pub(crate) const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Element {
        tag: String,
        /// Decoded attribute values, in source order.
        attrs: Vec<(String, String)>,
    },
    /// Markup exactly as it should be emitted (entities are not decoded).
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub(crate) struct Document {
    nodes: Vec<Node>,
    doctype: Option<String>,
    root: NodeId,
    explicit_root: bool,
}

impl Document {
    pub fn parse(input: &str) -> Self {
        parse::parse_document(input)
    }

    fn from_parts(
        nodes: Vec<Node>,
        doctype: Option<String>,
        root: NodeId,
        explicit_root: bool,
    ) -> Self {
        Self {
            nodes,
            doctype,
            root,
            explicit_root,
        }
    }

    /// Whether the source carried its own `<html>` element.
    pub fn has_explicit_root(&self) -> bool {
        self.explicit_root
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(id).map(|n| &mut n.kind)
        {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.nodes.get_mut(id).map(|n| &mut n.kind)
        {
            attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.tag(id).is_none() || self.has_class(id, class) {
            return;
        }
        let next = match self.attr(id, "class") {
            Some(c) if !c.trim().is_empty() => format!("{} {}", c.trim_end(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &next);
    }

    /// Removes `class`; an attribute left empty is dropped entirely so an
    /// add/remove pair leaves the markup unchanged.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(current) = self.attr(id, "class") else {
            return;
        };
        if !current.split_whitespace().any(|c| c == class) {
            return;
        }
        let rest = current
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if rest.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &rest);
        }
    }

    /// All nodes below `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every element reachable from the root, root first, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|id| self.tag(*id).is_some())
            .collect()
    }

    #[cfg(test)]
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.tag(*id) == Some(tag))
            .collect()
    }

    pub fn elements_by_id(&self, id_attr: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.attr(*id, "id") == Some(id_attr))
            .collect()
    }

    /// True when `id` is still connected to the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    pub fn head(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|id| self.tag(*id) == Some("head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|id| self.tag(*id) == Some("body"))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent >= self.nodes.len() || child >= self.nodes.len() || parent == child {
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Unlinks `id` from its parent. The node stays in the arena but is no
    /// longer attached to the document.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent].children.retain(|c| *c != id);
        self.nodes[id].parent = None;
    }

    /// Entity-decoded text of every text node below `id`, like `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(raw)) = self.node(id).map(|n| &n.kind) {
            out.push_str(&self.decoded_text(id, raw));
            return out;
        }
        for d in self.descendants(id) {
            if let Some(NodeKind::Text(raw)) = self.node(d).map(|n| &n.kind) {
                out.push_str(&self.decoded_text(d, raw));
            }
        }
        out
    }

    fn decoded_text<'a>(&self, id: NodeId, raw: &'a str) -> Cow<'a, str> {
        let in_raw_element = self
            .parent(id)
            .and_then(|p| self.tag(p))
            .is_some_and(is_raw_text);
        if in_raw_element {
            Cow::Borrowed(raw)
        } else {
            decode_entities(raw)
        }
    }

    /// Replaces every child of `id` with a single text node, like assigning
    /// `textContent`. Empty text leaves the element empty.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let Some(tag) = self.tag(id).map(str::to_string) else {
            if let Some(Node {
                kind: NodeKind::Text(raw),
                ..
            }) = self.nodes.get_mut(id)
            {
                *raw = escape_text(text);
            }
            return;
        };

        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if text.is_empty() {
            return;
        }
        let raw = if is_raw_text(&tag) {
            text.to_string()
        } else {
            escape_text(text)
        };
        let node = self.push_node(NodeKind::Text(raw));
        self.append_child(id, node);
    }

    pub fn to_html(&self) -> String {
        serialize::to_html(self)
    }
}

/// Returns `input` unchanged when it already is a complete document with an
/// `<html>` root; otherwise the same content wrapped into one.
pub(crate) fn ensure_document(input: &str) -> Cow<'_, str> {
    let doc = Document::parse(input);
    if doc.has_explicit_root() {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(doc.to_html())
    }
}

pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

/// Decodes the named entities generated pages actually use plus numeric
/// references. Unknown entities are kept verbatim.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|i| *i <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };

        let name = &tail[1..semi];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
