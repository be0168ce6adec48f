//! Python source parser
//!
//! Reduces one Python file to a [`CodeRecord`]: header, comments,
//! docstrings, long string literals, imports, and dotted-path-named
//! classes, functions, variables and calls. Parsing uses the tree-sitter
//! Python grammar; a file the grammar cannot make sense of yields an
//! all-empty record rather than failing the traversal that contains it.
//!
//! Scope naming: the path of a nested definition is its enclosing scope
//! names joined with `.`, so a second definition at the same path bumps the
//! existing counter while the same local name under two different scopes
//! stays two distinct entries.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use tree_sitter::Node as TsNode;

use crate::exclusions::ExclusionSet;
use crate::schema::{bump, CodeRecord};
use crate::textnorm::clean_plain_text;

/// Comments shorter than this (marker included) carry no text worth keeping
const MIN_COMMENT_LEN: usize = 4;

static NONTEXT_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^A-Za-z]+$").unwrap());
static CODING_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\x0b]*.*?coding[:=]").unwrap());
static VIM_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\x0b]*vim").unwrap());
static EMACS_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t\x0b]*-\*-[ \t]+mode:").unwrap());

/// Parser for the one analyzed language, configured with an exclusion set
#[derive(Debug, Clone)]
pub struct SourceParser {
    exclusions: Arc<ExclusionSet>,
}

impl SourceParser {
    pub fn new(exclusions: Arc<ExclusionSet>) -> Self {
        Self { exclusions }
    }

    /// Parse one file's text into a `CodeRecord`.
    ///
    /// Syntactically invalid input returns an empty record; the caller still
    /// produces a node for the file, with `code_language` set.
    pub fn parse(&self, source: &str) -> CodeRecord {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("Python grammar version mismatch");

        let tree = match parser.parse(source, None) {
            Some(tree) => tree,
            None => {
                warn!("tree-sitter returned no tree; emitting empty record");
                return CodeRecord::default();
            }
        };
        if tree.root_node().has_error() {
            warn!("syntax error in source file; emitting empty record");
            return CodeRecord::default();
        }

        let mut collector = Collector {
            src: source,
            exclusions: &self.exclusions,
            record: CodeRecord::default(),
            scope: Vec::new(),
            consumed: HashSet::new(),
        };
        collector.collect_header_and_comments(tree.root_node());
        collector.visit(tree.root_node());
        collector.record
    }
}

struct Collector<'a> {
    src: &'a str,
    exclusions: &'a ExclusionSet,
    record: CodeRecord,
    /// Local names of the enclosing class/function scopes
    scope: Vec<String>,
    /// Node ids of string nodes already taken as docstrings
    consumed: HashSet<usize>,
}

impl<'a> Collector<'a> {
    fn text(&self, node: TsNode) -> &'a str {
        node.utf8_text(self.src.as_bytes()).unwrap_or("")
    }

    fn dotted(&self, name: &str) -> String {
        if self.scope.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scope.join("."), name)
        }
    }

    // ------------------------------------------------------------------
    // Header and comments
    // ------------------------------------------------------------------

    /// Header = leading comment block + module docstring; every other
    /// comment chunk goes into the comments list.
    fn collect_header_and_comments(&mut self, root: TsNode) {
        // Leading comments are the module children before the first
        // statement; the hashbang and other ignorable lines drop out here.
        let mut leading: HashSet<usize> = HashSet::new();
        let mut module_docstring: Option<String> = None;
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "comment" {
                leading.insert(child.id());
                continue;
            }
            if let Some(string_node) = docstring_statement(child) {
                module_docstring = Some(string_literal_text(string_node, self.src));
                self.consumed.insert(string_node.id());
            }
            break;
        }

        let mut comments: Vec<TsNode> = Vec::new();
        gather_comments(root, &mut comments);

        let mut header_lines: Vec<String> = Vec::new();
        let mut chunk = String::new();
        let mut last_row: Option<usize> = None;
        for node in comments {
            let raw = self.text(node);
            if ignorable_comment(raw) {
                continue;
            }
            let stripped = strip_comment_marker(raw);
            if leading.contains(&node.id()) {
                header_lines.push(stripped.to_string());
                continue;
            }
            // Consecutive comment lines often carry one sentence split
            // across lines; gather them into a single chunk.
            let row = node.start_position().row;
            if last_row.is_some_and(|prev| row > prev + 1) && !chunk.is_empty() {
                self.push_comment_chunk(&chunk);
                chunk.clear();
            }
            if !chunk.is_empty() {
                chunk.push('\n');
            }
            chunk.push_str(stripped);
            last_row = Some(row);
        }
        if !chunk.is_empty() {
            self.push_comment_chunk(&chunk);
        }

        let mut header = header_lines.join("\n");
        if let Some(doc) = module_docstring {
            if !header.is_empty() {
                header.push(' ');
            }
            header.push_str(&doc);
        }
        self.record.header = clean_plain_text(&header);
    }

    fn push_comment_chunk(&mut self, chunk: &str) {
        let cleaned = clean_plain_text(chunk);
        if !cleaned.is_empty() {
            self.record.comments.push(cleaned);
        }
    }

    // ------------------------------------------------------------------
    // Tree walk
    // ------------------------------------------------------------------

    fn visit(&mut self, node: TsNode) {
        match node.kind() {
            "comment" => {}
            "import_statement" => self.visit_import(node),
            "import_from_statement" => self.visit_import_from(node),
            "class_definition" => self.visit_definition(node, true),
            "function_definition" => self.visit_definition(node, false),
            "assignment" | "augmented_assignment" => self.visit_assignment(node),
            "named_expression" => self.visit_named_expression(node),
            "for_statement" => self.visit_for(node),
            "call" => self.visit_call(node),
            "string" => self.visit_string(node),
            "concatenated_string" => self.visit_string(node),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: TsNode) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    /// `import a, b.c` counts the root segment of each dotted name
    fn visit_import(&mut self, node: TsNode) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let dotted = match child.kind() {
                "dotted_name" => Some(child),
                "aliased_import" => child.child_by_field_name("name"),
                _ => None,
            };
            if let Some(dotted) = dotted {
                if let Some(root) = self.text(dotted).split('.').next() {
                    if !root.is_empty() {
                        bump(&mut self.record.imports, root);
                    }
                }
            }
        }
    }

    /// `from x.y import z` counts `x`; `from . import z` counts nothing
    fn visit_import_from(&mut self, node: TsNode) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        let dotted = match module.kind() {
            "dotted_name" => Some(module),
            "relative_import" => {
                let mut cursor = module.walk();
                let found = module
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "dotted_name");
                found
            }
            _ => None,
        };
        if let Some(dotted) = dotted {
            if let Some(root) = self.text(dotted).split('.').next() {
                if !root.is_empty() {
                    bump(&mut self.record.imports, root);
                }
            }
        }
    }

    fn visit_definition(&mut self, node: TsNode, is_class: bool) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let kept = !name.is_empty() && !self.exclusions.ignorable_name(&name);
        if kept {
            let dotted = self.dotted(&name);
            if is_class {
                bump(&mut self.record.classes, dotted);
            } else {
                bump(&mut self.record.functions, dotted);
            }
        }

        // An excluded name contributes no scope segment; its children are
        // named against the enclosing scope, as if the wrapper were absent.
        if kept {
            self.scope.push(name);
        }

        if !is_class {
            self.visit_parameters(node);
        }

        if let Some(body) = node.child_by_field_name("body") {
            if let Some(string_node) = body.named_child(0).and_then(docstring_statement) {
                self.record
                    .docstrings
                    .push(clean_plain_text(&string_literal_text(string_node, self.src)));
                self.consumed.insert(string_node.id());
            }
            self.visit_children(body);
        }

        if kept {
            self.scope.pop();
        }
    }

    /// Parameter names count as variables in the function's scope
    fn visit_parameters(&mut self, func: TsNode) {
        let Some(params) = func.child_by_field_name("parameters") else {
            return;
        };
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let (name_node, default) = match param.kind() {
                "identifier" => (Some(param), None),
                "typed_parameter" => (param.named_child(0), None),
                "default_parameter" | "typed_default_parameter" => (
                    param.child_by_field_name("name"),
                    param.child_by_field_name("value"),
                ),
                "list_splat_pattern" | "dictionary_splat_pattern" => (param.named_child(0), None),
                _ => (None, None),
            };
            if let Some(name_node) = name_node {
                if name_node.kind() == "identifier" {
                    let name = self.text(name_node).to_string();
                    if !self.exclusions.ignorable_name(&name) {
                        let path = self.dotted(&name);
                        bump(&mut self.record.variables, path);
                    }
                }
            }
            // Default values may contain calls and strings worth recording.
            if let Some(default) = default {
                self.visit(default);
            }
        }
    }

    fn visit_assignment(&mut self, node: TsNode) {
        if let Some(left) = node.child_by_field_name("left") {
            self.record_targets(left);
        }
        if let Some(right) = node.child_by_field_name("right") {
            self.visit(right);
        }
    }

    fn visit_named_expression(&mut self, node: TsNode) {
        if let Some(name) = node.child_by_field_name("name") {
            self.record_targets(name);
        }
        if let Some(value) = node.child_by_field_name("value") {
            self.visit(value);
        }
    }

    /// Loop variables shadow outer bindings, so they count unconditionally
    fn visit_for(&mut self, node: TsNode) {
        if let Some(left) = node.child_by_field_name("left") {
            self.record_targets(left);
        }
        let mut cursor = node.walk();
        let left_id = node.child_by_field_name("left").map(|n| n.id());
        for child in node.named_children(&mut cursor) {
            if Some(child.id()) != left_id {
                self.visit(child);
            }
        }
    }

    /// Record every assignment-target name reachable under `node`
    fn record_targets(&mut self, node: TsNode) {
        match node.kind() {
            "identifier" => {
                let name = self.text(node).to_string();
                if !self.exclusions.ignorable_name(&name) {
                    let path = self.dotted(&name);
                    bump(&mut self.record.variables, path);
                }
            }
            "attribute" => {
                if let Some(name) = flatten_attribute(node, self.src) {
                    if !self.exclusions.ignorable_name(final_segment(&name)) {
                        let path = self.dotted(&name);
                        bump(&mut self.record.variables, path);
                    }
                }
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.record_targets(child);
                }
            }
            // Subscript targets and stars carry no useful standalone name.
            _ => {}
        }
    }

    fn visit_call(&mut self, node: TsNode) {
        if let Some(function) = node.child_by_field_name("function") {
            if let Some(name) = callee_name(function, self.src) {
                if !self.exclusions.ignorable_name(final_segment(&name)) {
                    bump(&mut self.record.calls, name);
                }
            }
            // A chained callee like foo(x).bar() still holds inner calls.
            if function.kind() != "identifier" && function.kind() != "attribute" {
                self.visit(function);
            } else if function.kind() == "attribute" {
                if let Some(object) = function.child_by_field_name("object") {
                    if object.kind() == "call" {
                        self.visit(object);
                    }
                }
            }
        }
        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for arg in arguments.named_children(&mut cursor) {
                if arg.kind() == "keyword_argument" {
                    if let Some(value) = arg.child_by_field_name("value") {
                        self.visit(value);
                    }
                } else {
                    self.visit(arg);
                }
            }
        }
    }

    /// Long string literals are counted by exact (cleaned) text; docstrings
    /// were consumed earlier and do not reappear here.
    fn visit_string(&mut self, node: TsNode) {
        if self.consumed.contains(&node.id()) {
            return;
        }
        let text = string_literal_text(node, self.src);
        if !self.exclusions.ignorable_string(&text) {
            bump(&mut self.record.strings, clean_plain_text(&text));
        }
        // f-string interpolations may contain calls and names.
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "interpolation" {
                self.visit_children(child);
            }
        }
    }
}

// ----------------------------------------------------------------------
// Node helpers
// ----------------------------------------------------------------------

/// Collect every comment node in document order
fn gather_comments<'t>(node: TsNode<'t>, out: &mut Vec<TsNode<'t>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            out.push(child);
        } else {
            gather_comments(child, out);
        }
    }
}

/// If `node` is an expression statement holding a bare string, return the
/// string node. This is the docstring shape for modules, classes and
/// functions.
fn docstring_statement(node: TsNode) -> Option<TsNode> {
    if node.kind() != "expression_statement" || node.named_child_count() != 1 {
        return None;
    }
    let child = node.named_child(0)?;
    matches!(child.kind(), "string" | "concatenated_string").then_some(child)
}

/// Text of a string literal without quotes or prefixes
fn string_literal_text(node: TsNode, src: &str) -> String {
    let mut out = String::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        let mut cursor = current.walk();
        let children: Vec<TsNode> = current.children(&mut cursor).collect();
        match current.kind() {
            "string_content" => {
                out.push_str(current.utf8_text(src.as_bytes()).unwrap_or(""));
            }
            "string" | "concatenated_string" => {
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
            _ => {}
        }
    }
    out
}

/// Flatten an attribute chain to a dotted name, dropping a leading `self`
fn flatten_attribute(node: TsNode, src: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "attribute" => {
                let attr = current.child_by_field_name("attribute")?;
                parts.push(attr.utf8_text(src.as_bytes()).ok()?);
                current = current.child_by_field_name("object")?;
            }
            "identifier" => {
                parts.push(current.utf8_text(src.as_bytes()).ok()?);
                break;
            }
            // Chained calls like foo().bar resolve through the inner callee;
            // subscripts resolve through the subscripted value.
            "call" => current = current.child_by_field_name("function")?,
            "subscript" => current = current.child_by_field_name("value")?,
            _ => break,
        }
    }
    parts.reverse();
    if parts.first() == Some(&"self") {
        parts.remove(0);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Dotted name a call expression resolves to, if any
fn callee_name(function: TsNode, src: &str) -> Option<String> {
    match function.kind() {
        "identifier" => function.utf8_text(src.as_bytes()).ok().map(str::to_string),
        "attribute" => flatten_attribute(function, src),
        _ => None,
    }
}

fn final_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Strip the leading comment marker and its padding
fn strip_comment_marker(text: &str) -> &str {
    text.trim_start_matches(['#', ' ', '\t'])
}

/// Comments with no prose value: hashbangs, coding lines, editor
/// modelines, separator rulings and near-empty lines.
fn ignorable_comment(text: &str) -> bool {
    if !text.trim_start().starts_with('#') {
        return false;
    }
    if text.len() < MIN_COMMENT_LEN || text.starts_with("#!") {
        return true;
    }
    let body = strip_comment_marker(text);
    NONTEXT_COMMENT.is_match(text)
        || CODING_COMMENT.is_match(body)
        || VIM_COMMENT.is_match(body)
        || EMACS_COMMENT.is_match(body)
}
