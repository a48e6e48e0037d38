use super::{escape_attr, is_void, Document, NodeId, NodeKind};

enum Step<'a> {
    Open(NodeId),
    Close(&'a str),
}

/// Explicit work stack instead of recursion: nesting depth in generated pages
/// is unbounded.
pub(super) fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = doc.doctype() {
        out.push_str("<!DOCTYPE ");
        out.push_str(doctype);
        out.push('>');
    }

    let mut stack = vec![Step::Open(doc.root())];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Close(tag) => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                continue;
            }
            Step::Open(id) => id,
        };
        let Some(node) = doc.node(id) else {
            continue;
        };

        match &node.kind {
            NodeKind::Text(raw) => out.push_str(raw),
            NodeKind::Comment(raw) => {
                out.push_str("<!--");
                out.push_str(raw);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');

                if is_void(tag) {
                    continue;
                }
                stack.push(Step::Close(tag));
                stack.extend(node.children.iter().rev().map(|child| Step::Open(*child)));
            }
        }
    }
    out
}
