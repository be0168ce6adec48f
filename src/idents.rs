//! Identifier view over a node tree

use indexmap::IndexSet;

use crate::schema::{Node, NodeBody};

/// Collect every distinct identifier declared or called across the tree,
/// in first-seen order. Scoped names keep their dotted path.
pub fn all_identifiers(tree: &Node) -> Vec<String> {
    let mut seen = IndexSet::new();
    collect(tree, &mut seen);
    seen.into_iter().collect()
}

fn collect(node: &Node, seen: &mut IndexSet<String>) {
    match &node.body {
        NodeBody::Children(children) => {
            for child in children {
                collect(child, seen);
            }
        }
        NodeBody::Code(record) => {
            for name in record
                .classes
                .keys()
                .chain(record.functions.keys())
                .chain(record.variables.keys())
                .chain(record.calls.keys())
            {
                seen.insert(name.clone());
            }
        }
        NodeBody::Text(_) | NodeBody::Ignored => {}
    }
}

/// Split a camel-case identifier at each lowercase-to-uppercase transition.
///
/// Only that one transition counts, so acronym runs stay attached to what
/// follows them: `getHTTPResponse` stays `["get", "HTTPResponse"]`.
pub fn naive_camelcase_split(identifier: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in identifier.chars() {
        if prev_lower && c.is_ascii_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev_lower = c.is_ascii_lowercase();
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
