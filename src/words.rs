//! Flattened word view over a node tree
//!
//! Collapses the textual fragments of an extracted tree into a flat list
//! of cleaned words, in tree order with duplicates kept. Only files whose
//! detected human language is English contribute; Ignored nodes and empty
//! fragments do not.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::idents::naive_camelcase_split;
use crate::schema::{Node, NodeBody};

/// Which textual sources feed the word view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFilter {
    /// Text files and code fragments alike
    All,
    /// Only normalized text files
    Text,
    /// Only textual fragments of code files
    Code,
}

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?|ftp|file)://[^\s]+").unwrap()
});
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap()
});

/// Collect every word in tree order
pub fn all_words(tree: &Node, filter: WordFilter) -> Vec<String> {
    let mut words = Vec::new();
    collect(tree, filter, &mut words);
    words
}

fn collect(node: &Node, filter: WordFilter, out: &mut Vec<String>) {
    match &node.body {
        NodeBody::Children(children) => {
            for child in children {
                collect(child, filter, out);
            }
        }
        NodeBody::Ignored => {}
        NodeBody::Text(text) => {
            if filter != WordFilter::Code && is_english(node) {
                out.extend(extract_text_words(text));
            }
        }
        NodeBody::Code(record) => {
            if filter != WordFilter::Text && is_english(node) {
                out.extend(extract_text_words(&record.header));
                for chunk in &record.comments {
                    out.extend(extract_text_words(chunk));
                }
                for doc in &record.docstrings {
                    out.extend(extract_text_words(doc));
                }
                for (literal, count) in &record.strings {
                    for _ in 0..*count {
                        out.extend(extract_text_words(literal));
                    }
                }
            }
        }
    }
}

fn is_english(node: &Node) -> bool {
    node.text_language.as_deref() == Some("en")
}

/// Break one text fragment into cleaned words.
///
/// URLs and mail addresses go first, then the text splits on whitespace
/// and on the separator characters that glue tokens together in prose and
/// identifiers. Camel-case words split at each lowercase-to-uppercase
/// transition, and words in strict title case fold to lowercase.
pub fn extract_text_words(text: &str) -> Vec<String> {
    let text = URL.replace_all(text, " ");
    let text = EMAIL.replace_all(&text, " ");
    let text: String = text
        .chars()
        .map(|c| if "|<>&+=$%".contains(c) { ' ' } else { c })
        .collect();

    let mut words = Vec::new();
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| {
            c.is_ascii_punctuation() && !"-/_.:'*".contains(c) || c == '\u{2019}' || c == '\u{201c}' || c == '\u{201d}'
        });
        for piece in token
            .split(|c: char| "-/_.:*'\\\u{2019}".contains(c) || c.is_ascii_digit())
        {
            let piece = piece.trim_matches(|c: char| c.is_ascii_punctuation());
            if piece.is_empty() || !piece.is_ascii() || !piece.chars().all(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            for word in naive_camelcase_split(piece) {
                words.push(lower_if_title_case(&word));
            }
        }
    }
    words
}

/// Fold "Title" to "title" but leave "HTTPServer" and "macOS" alone
fn lower_if_title_case(word: &str) -> String {
    let mut chars = word.chars();
    let title = match chars.next() {
        Some(first) => first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_lowercase()),
        None => false,
    };
    if title {
        word.to_lowercase()
    } else {
        word.to_string()
    }
}
