use super::{decode_entities, is_raw_text, is_void, Document, Node, NodeId, NodeKind};

/// Tags that close an open `<p>` when they start.
const CLOSES_P: [&str; 26] = [
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol",
    "p", "pre", "section", "table",
];

/// Top-level elements that belong in `<head>` when we have to build one.
const HEAD_ELEMENTS: [&str; 5] = ["base", "link", "meta", "style", "title"];

#[derive(Debug)]
struct ParsedTag {
    name: String,
    attrs: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
    top: Vec<NodeId>,
    doctype: Option<String>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            open: Vec::new(),
            top: Vec::new(),
            doctype: None,
            root: None,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        let parent = self.open.last().copied();
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.top.push(id),
        }
        id
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let last = match self.open.last() {
            Some(p) => self.nodes[*p].children.last().copied(),
            None => self.top.last().copied(),
        };
        if let Some(NodeKind::Text(prev)) = last.map(|id| &mut self.nodes[id].kind) {
            prev.push_str(raw);
            return;
        }
        self.push(NodeKind::Text(raw.to_string()));
    }

    fn current_tag(&self) -> Option<&str> {
        let id = *self.open.last()?;
        match &self.nodes[id].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn tag_of(&self, id: NodeId) -> &str {
        match &self.nodes[id].kind {
            NodeKind::Element { tag, .. } => tag.as_str(),
            _ => "",
        }
    }

    /// Closes the nearest open `name` element, as long as no element in
    /// `scope` sits above it.
    fn close_in_scope(&mut self, name: &str, scope: &[&str]) {
        for i in (0..self.open.len()).rev() {
            let tag = self.tag_of(self.open[i]);
            if tag == name {
                self.open.truncate(i);
                return;
            }
            if scope.contains(&tag) {
                return;
            }
        }
    }

    fn implicit_close(&mut self, name: &str) {
        if self.current_tag() == Some("p") && CLOSES_P.contains(&name) {
            self.open.pop();
        }
        match name {
            "li" => self.close_in_scope("li", &["ul", "ol"]),
            "dt" | "dd" => {
                self.close_in_scope("dt", &["dl"]);
                self.close_in_scope("dd", &["dl"]);
            }
            "option" => self.close_in_scope("option", &["select", "datalist"]),
            "tr" => self.close_in_scope("tr", &["table", "thead", "tbody", "tfoot"]),
            "td" | "th" => {
                self.close_in_scope("td", &["tr", "table"]);
                self.close_in_scope("th", &["tr", "table"]);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: ParsedTag, input: &str, next_idx: usize) -> usize {
        if tag.name == "html" {
            if let Some(root) = self.root {
                // Repeated <html>: merge attributes that are not set yet.
                if let NodeKind::Element { attrs, .. } = &mut self.nodes[root].kind {
                    for (k, v) in tag.attrs {
                        if !attrs.iter().any(|(ek, _)| *ek == k) {
                            attrs.push((k, v));
                        }
                    }
                }
                return next_idx;
            }
            if self.open.is_empty() {
                let id = self.push(NodeKind::Element {
                    tag: tag.name,
                    attrs: tag.attrs,
                });
                self.root = Some(id);
                self.open.push(id);
                return next_idx;
            }
        }

        self.implicit_close(&tag.name);

        let name = tag.name.clone();
        let id = self.push(NodeKind::Element {
            tag: tag.name,
            attrs: tag.attrs,
        });

        if is_void(&name) || tag.self_closing {
            return next_idx;
        }

        if is_raw_text(&name) {
            let (raw, after) = read_raw_text_until_end_tag(input, next_idx, &name);
            if !raw.is_empty() {
                self.nodes.push(Node {
                    kind: NodeKind::Text(raw.to_string()),
                    parent: Some(id),
                    children: Vec::new(),
                });
                let text_id = self.nodes.len() - 1;
                self.nodes[id].children.push(text_id);
            }
            return after;
        }

        self.open.push(id);
        next_idx
    }

    fn end(&mut self, name: &str) {
        if is_void(name) {
            return;
        }
        if let Some(pos) = self.open.iter().rposition(|id| self.tag_of(*id) == name) {
            // Never pop the root on a stray </html>; content may follow.
            if Some(self.open[pos]) == self.root && name == "html" {
                self.open.truncate(pos + 1);
                return;
            }
            self.open.truncate(pos);
        }
    }

    fn finish(mut self) -> Document {
        match self.root {
            Some(root) => {
                // Stray top-level content after </html> belongs in the body.
                let stray: Vec<NodeId> = self
                    .top
                    .iter()
                    .copied()
                    .filter(|id| *id != root && !self.is_blank_or_comment(*id))
                    .collect();
                let doctype = self.doctype.take();
                let mut doc = Document::from_parts(self.nodes, doctype, root, true);
                let target = doc.body().unwrap_or(root);
                for id in stray {
                    doc.append_child(target, id);
                }
                doc
            }
            None => self.wrap_into_document(),
        }
    }

    fn is_blank_or_comment(&self, id: NodeId) -> bool {
        match &self.nodes[id].kind {
            NodeKind::Text(t) => t.trim().is_empty(),
            NodeKind::Comment(_) => true,
            NodeKind::Element { .. } => false,
        }
    }

    fn wrap_into_document(mut self) -> Document {
        let top = std::mem::take(&mut self.top);
        let tags: Vec<Option<String>> = top
            .iter()
            .map(|id| match &self.nodes[*id].kind {
                NodeKind::Element { tag, .. } => Some(tag.clone()),
                _ => None,
            })
            .collect();
        let find_top = |name: &str| {
            top.iter()
                .zip(&tags)
                .find(|(_, t)| t.as_deref() == Some(name))
                .map(|(id, _)| *id)
        };
        let existing_head = find_top("head");
        let existing_body = find_top("body");
        let blanks: Vec<bool> = top
            .iter()
            .map(|id| matches!(&self.nodes[*id].kind, NodeKind::Text(t) if t.trim().is_empty()))
            .collect();

        self.open.clear();
        let root = self.push(NodeKind::Element {
            tag: "html".to_string(),
            attrs: Vec::new(),
        });
        let mut doc = Document::from_parts(self.nodes, self.doctype, root, false);

        let head = existing_head.unwrap_or_else(|| doc.create_element("head"));
        let body = existing_body.unwrap_or_else(|| doc.create_element("body"));
        doc.append_child(root, head);
        doc.append_child(root, body);

        let mut seen_body_content = false;
        for ((id, tag), blank) in top.iter().zip(&tags).zip(&blanks) {
            if *id == head || *id == body || *blank {
                continue;
            }
            let head_bound = !seen_body_content
                && tag.as_deref().is_some_and(|t| HEAD_ELEMENTS.contains(&t));
            if head_bound {
                doc.append_child(head, *id);
            } else {
                seen_body_content = true;
                doc.append_child(body, *id);
            }
        }
        doc
    }
}

pub(super) fn parse_document(input: &str) -> Document {
    let bytes = input.as_bytes();
    let mut b = TreeBuilder::new();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            b.text(&input[idx..next]);
            idx = next;
            continue;
        }

        // `<!-->` and `<!--->` are complete, empty comments.
        if let Some(len) = [b"<!-->".as_slice(), b"<!--->".as_slice()]
            .into_iter()
            .find(|pat| starts_with(bytes, idx, pat))
            .map(<[u8]>::len)
        {
            b.push(NodeKind::Comment(String::new()));
            idx += len;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            let end = find_subslice(bytes, idx.saturating_add(4), b"-->");
            let body_end = end.unwrap_or(bytes.len());
            b.push(NodeKind::Comment(input[idx + 4..body_end.max(idx + 4)].to_string()));
            idx = end.map(|e| e + 3).unwrap_or(bytes.len());
            continue;
        }

        if starts_with_ignore_ascii_case(bytes, idx, b"<!doctype") {
            let end = skip_to_gt(bytes, idx);
            // Unterminated doctypes run to the end of input.
            let inner_end = match bytes.get(end.wrapping_sub(1)) {
                Some(b'>') => end - 1,
                _ => end,
            };
            let inner = input.get(idx + 9..inner_end.max(idx + 9)).unwrap_or("").trim();
            if b.doctype.is_none() && b.root.is_none() {
                b.doctype = Some(if inner.is_empty() { "html" } else { inner }.to_string());
            }
            idx = end;
            continue;
        }

        if starts_with(bytes, idx, b"<!") || starts_with(bytes, idx, b"<?") {
            idx = skip_to_gt(bytes, idx);
            continue;
        }

        match parse_tag(input, idx) {
            Some((tag, next_idx)) if tag.is_end => {
                b.end(&tag.name);
                idx = next_idx;
            }
            Some((tag, next_idx)) => {
                idx = b.start(tag, input, next_idx);
            }
            None => {
                b.text("&lt;");
                idx += 1;
            }
        }
    }

    b.finish()
}

fn parse_tag(input: &str, start: usize) -> Option<(ParsedTag, usize)> {
    let bytes = input.as_bytes();
    let mut idx = start + 1;
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx += 1;
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx += 1;
    }
    if idx == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = input[name_start..idx].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attrs,
                        is_end,
                        self_closing: false,
                    },
                    idx + 1,
                ));
            }
            Some(b'/') if bytes.get(idx + 1).copied() == Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attrs,
                        is_end,
                        self_closing: true,
                    },
                    idx + 2,
                ));
            }
            Some(b'/') => {
                idx += 1;
                continue;
            }
            Some(_) => {}
        }

        let attr_start = idx;
        while idx < bytes.len() && !is_attr_name_end(bytes[idx]) {
            idx += 1;
        }
        if idx == attr_start {
            // Lone quote or `=`: skip it.
            idx += 1;
            continue;
        }
        let attr_name = input[attr_start..idx].to_ascii_lowercase();

        let after_name = skip_spaces(bytes, idx);
        let mut value = String::new();
        if bytes.get(after_name).copied() == Some(b'=') {
            idx = skip_spaces(bytes, after_name + 1);
            match bytes.get(idx).copied() {
                Some(q @ (b'"' | b'\'')) => {
                    let end = find_byte(bytes, idx + 1, q)?;
                    value = decode_entities(&input[idx + 1..end]).into_owned();
                    idx = end + 1;
                }
                Some(_) => {
                    let v_start = idx;
                    while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>'
                    {
                        idx += 1;
                    }
                    value = decode_entities(&input[v_start..idx]).into_owned();
                }
                None => return None,
            }
        }

        if !is_end && !attrs.iter().any(|(k, _)| *k == attr_name) {
            attrs.push((attr_name, value));
        }
    }
}

fn read_raw_text_until_end_tag<'a>(input: &'a str, start: usize, tag_name: &str) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx + 1).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx + 2, tag_bytes)
            && tag_name_boundary(bytes, idx + 2 + tag_bytes.len())
        {
            let end = skip_to_gt(bytes, idx);
            return (&input[start..idx], end);
        }
        idx += 1;
    }

    (&input[start..], bytes.len())
}

fn skip_to_gt(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() {
        if bytes[idx] == b'>' {
            return idx + 1;
        }
        idx += 1;
    }
    bytes.len()
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    if end > bytes.len() {
        return false;
    }
    bytes[idx..end]
        .iter()
        .zip(pattern.iter())
        .all(|(left, right)| left.eq_ignore_ascii_case(right))
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}
