//! Output data model: the recursive node tree and per-file code records
//!
//! The serialized shape is deliberately simple and recursive. Every node is
//! a record with `name`, `type` and `body` keys; file nodes additionally
//! carry `text_language` and `code_language`. A directory body is an ordered
//! list of child nodes. A file body is one of: an empty string (empty file),
//! a plain-text string, a nested code record, or `null` (ignored file).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry (file or directory) in the recursive output tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub body: NodeBody,

    /// Dominant human language of the file's text, as an ISO 639-1 code.
    /// Absent for directories and ignored files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_language: Option<String>,

    /// Programming language of the file, when the file is recognized code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
}

/// Node kind discriminator, serialized as `"dir"` / `"file"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "dir")]
    Directory,
    #[serde(rename = "file")]
    File,
}

/// Body of a node.
///
/// Untagged: directories serialize as arrays, code files as objects, text
/// files as strings (the empty string for empty files) and ignored files as
/// `null`. Variant order matters for deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeBody {
    Children(Vec<Node>),
    Code(Box<CodeRecord>),
    Text(String),
    Ignored,
}

impl Node {
    /// Build a directory node from its ordered children
    pub fn directory(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            body: NodeBody::Children(children),
            text_language: None,
            code_language: None,
        }
    }

    /// Build a file node
    pub fn file(
        name: impl Into<String>,
        body: NodeBody,
        text_language: Option<String>,
        code_language: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            body,
            text_language,
            code_language,
        }
    }

    /// Build an ignored file node (no body, no language fields)
    pub fn ignored(name: impl Into<String>) -> Self {
        Self::file(name, NodeBody::Ignored, None, None)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.body, NodeBody::Ignored)
    }
}

/// Mapping from name to occurrence count, insertion order preserved
pub type CountedNames = IndexMap<String, u32>;

/// The structured reduction of one code file.
///
/// `classes`, `functions` and `variables` are keyed by dotted path (the
/// enclosing scope names joined with `.`); a second definition at the same
/// path increments the existing counter instead of adding an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Leading comment block and/or module docstring, possibly empty
    pub header: String,
    pub comments: Vec<String>,
    pub docstrings: Vec<String>,
    pub strings: CountedNames,
    pub imports: CountedNames,
    pub classes: CountedNames,
    pub functions: CountedNames,
    pub variables: CountedNames,
    pub calls: CountedNames,
}

impl CodeRecord {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
            && self.comments.is_empty()
            && self.docstrings.is_empty()
            && self.strings.is_empty()
            && self.imports.is_empty()
            && self.classes.is_empty()
            && self.functions.is_empty()
            && self.variables.is_empty()
            && self.calls.is_empty()
    }
}

/// Bump the counter for `name`, creating it at zero first if absent
pub(crate) fn bump(map: &mut CountedNames, name: impl Into<String>) {
    *map.entry(name.into()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_body_serializes_as_array() {
        let node = Node::directory("src", vec![Node::ignored("a.bin")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "dir");
        assert!(json["body"].is_array());
        assert_eq!(json["body"][0]["body"], serde_json::Value::Null);
    }

    #[test]
    fn empty_file_body_is_empty_string() {
        let node = Node::file("empty.txt", NodeBody::Text(String::new()), None, None);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["body"], "");
        assert!(json.get("text_language").is_none());
    }

    #[test]
    fn node_tree_round_trips_through_json() {
        let mut record = CodeRecord::default();
        bump(&mut record.classes, "Outer.Inner");
        bump(&mut record.classes, "Outer.Inner");
        let tree = Node::directory(
            "repo",
            vec![
                Node::file(
                    "mod.py",
                    NodeBody::Code(Box::new(record)),
                    Some("en".into()),
                    Some("Python".into()),
                ),
                Node::file("notes.txt", NodeBody::Text("hello".into()), Some("en".into()), None),
            ],
        );
        let json = serde_json::to_string(&tree).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn bump_counts_repeats_in_place() {
        let mut map = CountedNames::default();
        bump(&mut map, "walk");
        bump(&mut map, "parse");
        bump(&mut map, "walk");
        assert_eq!(map.get("walk"), Some(&2));
        // Insertion order survives the repeat.
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["walk", "parse"]);
    }
}
