//! Text normalization for prose documents and embedded code text
//!
//! Non-plain formats are first rendered to HTML (in-process for Markdown,
//! via external converter tools for the rest), then reduced to flat text by
//! walking the HTML tree. `<pre>` and `<img>` elements are dropped
//! entirely, and block elements that lack terminal punctuation get a period
//! appended so that downstream sentence segmentation has something to work
//! with. Real-world README conversions very often come out without any
//! sentence punctuation at all.

use std::io::Write;
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node as TsNode;
use unicode_normalization::UnicodeNormalization;

use crate::error::{ExtractError, Result};
use crate::language::{human_language, is_western};

/// Closed set of supported markup formats.
///
/// Adding a format means adding a variant here and one conversion arm in
/// [`normalize_document`], nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupFormat {
    Html,
    Markdown,
    AsciiDoc,
    ReStructuredText,
    Rtf,
    Textile,
}

impl MarkupFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::AsciiDoc => "asciidoc",
            Self::ReStructuredText => "restructuredtext",
            Self::Rtf => "rtf",
            Self::Textile => "textile",
        }
    }
}

/// Punctuation that already terminates a block; nothing gets appended after
/// these. Several entries are non-ASCII fullwidth or typographic forms.
const OKAY_ENDINGS: &[char] = &[
    '-', '–', '—', '…', '?', '!', '.', ',', ':', ';', '‚', '‼', '⁇', '⁈', '⁉', '：', '；',
    '．', '，',
];

fn ends_okay(text: &str) -> bool {
    text.trim_end()
        .chars()
        .next_back()
        .map(|c| OKAY_ENDINGS.contains(&c))
        .unwrap_or(true)
}

/// Render a document of the given format down to flat plain text.
///
/// The caller is responsible for the 1 MiB ceiling; oversized files must be
/// routed to the Ignored outcome instead of reaching this function.
pub fn normalize_document(input: &str, format: MarkupFormat) -> Result<String> {
    let html = match format {
        MarkupFormat::Html => input.to_string(),
        MarkupFormat::Markdown => markdown_to_html(input),
        MarkupFormat::AsciiDoc => html_via_command(
            "asciidoc",
            Command::new("asciidoctor").args(["--no-header-footer", "--safe", "--quiet", "-o", "-", "-"]),
            input,
        )?,
        MarkupFormat::ReStructuredText => {
            html_via_command("restructuredtext", Command::new("pandoc").args(["-f", "rst", "-t", "html"]), input)?
        }
        MarkupFormat::Rtf => {
            html_via_command("rtf", Command::new("pandoc").args(["-f", "rtf", "-t", "html"]), input)?
        }
        MarkupFormat::Textile => {
            html_via_command("textile", Command::new("pandoc").args(["-f", "textile", "-t", "html"]), input)?
        }
    };
    Ok(html_to_text(&html))
}

fn markdown_to_html(input: &str) -> String {
    let parser = pulldown_cmark::Parser::new(input);
    let mut html = String::with_capacity(input.len() * 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Run an external converter, feeding the document on stdin and reading
/// HTML from stdout. A non-zero exit or a spawn failure is a recoverable
/// `ConversionFailed`; the walker degrades the file to Ignored.
fn html_via_command(format: &'static str, cmd: &mut Command, input: &str) -> Result<String> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExtractError::ConversionFailed {
            format,
            message: e.to_string(),
        })?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| ExtractError::ConversionFailed {
                format,
                message: e.to_string(),
            })?;
    }

    let output = child.wait_with_output().map_err(|e| ExtractError::ConversionFailed {
        format,
        message: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(ExtractError::ConversionFailed {
            format,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Strip an HTML document to flat text, repairing block punctuation.
pub fn html_to_text(html: &str) -> String {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_html::LANGUAGE.into())
        .expect("HTML grammar version mismatch");

    let Some(tree) = parser.parse(html, None) else {
        return String::new();
    };

    let mut out = String::with_capacity(html.len() / 2);
    collect_text(tree.root_node(), html, &mut out);

    // NFKD flattens typographic forms, then whitespace collapses to single
    // spaces so the result reads as one flat string.
    let normalized: String = out.nfkd().collect();
    let flat = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.trim().to_string()
}

/// Block elements that should end in sentence punctuation
fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "li" | "th" | "td"
    )
}

/// Elements dropped entirely, content included
fn is_dropped_tag(tag: &str) -> bool {
    matches!(tag, "pre" | "img")
}

fn tag_name(element: TsNode, src: &str) -> Option<String> {
    let mut cursor = element.walk();
    for child in element.children(&mut cursor) {
        if matches!(child.kind(), "start_tag" | "self_closing_tag") {
            let mut inner = child.walk();
            for part in child.children(&mut inner) {
                if part.kind() == "tag_name" {
                    return part.utf8_text(src.as_bytes()).ok().map(|t| t.to_lowercase());
                }
            }
        }
    }
    None
}

fn collect_text(node: TsNode, src: &str, out: &mut String) {
    match node.kind() {
        "text" => {
            if let Ok(text) = node.utf8_text(src.as_bytes()) {
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(text);
                    out.push(' ');
                }
            }
        }
        "entity" => {
            if let Ok(text) = node.utf8_text(src.as_bytes()) {
                out.push_str(decode_entity(text));
            }
        }
        "comment" | "doctype" | "script_element" | "style_element" => {}
        "element" => {
            let tag = tag_name(node, src);
            if tag.as_deref().is_some_and(is_dropped_tag) {
                return;
            }
            let start = out.len();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_text(child, src, out);
            }
            if tag.as_deref().is_some_and(is_block_tag) && !ends_okay(&out[start..]) {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push_str(". ");
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_text(child, src, out);
            }
        }
    }
}

fn decode_entity(entity: &str) -> &'static str {
    match entity {
        "&amp;" => "&",
        "&lt;" => "<",
        "&gt;" => ">",
        "&quot;" => "\"",
        "&#39;" | "&apos;" => "'",
        "&nbsp;" => " ",
        _ => " ",
    }
}

static DIVIDER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\W*[-=_.+^*#~]{2,}\W*$").unwrap());
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\n+").unwrap());
static SPHINX_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(:param|:return|:type|:rtype)").unwrap());
static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(c\)|::|:-\)|:\)|:-\(|:-P|<3|-->|->").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Limited cleanup of free text as it appears in code and converted docs.
///
/// Non-Western text is returned untouched; the punctuation rewriting below
/// only makes sense for scripts that use Western sentence conventions.
pub fn clean_plain_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    if !is_western(&human_language(text)) {
        return text.to_string();
    }

    let text: String = text.nfkd().collect();
    let text = DIVIDER_LINE.replace_all(&text, " ");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    let text = join_single_newlines(&text);
    let text = SPHINX_TAG.replace_all(&text, "\n\n$1");
    let text = NOISE.replace_all(&text, "");
    let text = punctuate_paragraph_breaks(&text);
    let text = SPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Turn a lone newline into a space; paragraph breaks (two or more) stay.
fn join_single_newlines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            let prev_nl = i > 0 && chars[i - 1] == '\n';
            let next_nl = chars.get(i + 1) == Some(&'\n');
            if !prev_nl && !next_nl && i > 0 && i + 1 < chars.len() {
                out.push(' ');
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// A paragraph break usually means a sentence just ended; add the period
/// the author left off.
fn punctuate_paragraph_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(pos) = rest.find("\n\n") {
        let (before, after) = rest.split_at(pos);
        let trimmed = before.trim_end_matches([' ', '\t']);
        out.push_str(trimmed);
        if !ends_okay(trimmed) && !trimmed.is_empty() {
            out.push('.');
        }
        out.push_str(&before[trimmed.len()..]);
        out.push_str("\n\n");
        rest = &after[2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_empty_string() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(normalize_document("", MarkupFormat::Html).unwrap(), "");
    }

    #[test]
    fn headings_and_paragraphs_get_periods() {
        let html = "<h1>Overview</h1><p>This tool walks repositories</p>";
        let text = html_to_text(html);
        assert_eq!(text, "Overview. This tool walks repositories.");
    }

    #[test]
    fn punctuated_blocks_are_left_alone() {
        let html = "<p>Already a sentence.</p><p>Still fine!</p>";
        assert_eq!(html_to_text(html), "Already a sentence. Still fine!");
    }

    #[test]
    fn pre_and_img_are_dropped() {
        let html = "<p>Install it:</p><pre>cargo install repodistill</pre>\
                    <img src=\"badge.svg\"><p>Then run it.</p>";
        let text = html_to_text(html);
        assert!(!text.contains("cargo install"));
        assert!(!text.contains("badge"));
        assert!(text.contains("Then run it."));
    }

    #[test]
    fn list_items_and_table_cells_are_terminated() {
        let html = "<ul><li>first entry</li><li>second entry</li></ul>\
                    <table><tr><td>cell one</td></tr></table>";
        let text = html_to_text(html);
        assert_eq!(text, "first entry. second entry. cell one.");
    }

    #[test]
    fn markdown_renders_through_the_html_pipeline() {
        let md = "# Title\n\nSome description of the project\n\n- point one\n- point two\n";
        let text = normalize_document(md, MarkupFormat::Markdown).unwrap();
        assert!(text.starts_with("Title."));
        assert!(text.contains("Some description of the project."));
        assert!(text.contains("point one."));
    }

    #[test]
    fn clean_plain_text_strips_divider_lines() {
        let text = "A header comment.\n# ----------------------------\nThe body follows here.";
        let cleaned = clean_plain_text(text);
        assert!(!cleaned.contains("----"));
        assert!(cleaned.contains("A header comment."));
        assert!(cleaned.contains("The body follows here."));
    }

    #[test]
    fn clean_plain_text_joins_wrapped_lines() {
        let text = "This sentence was wrapped\nacross two comment lines.";
        assert_eq!(
            clean_plain_text(text),
            "This sentence was wrapped across two comment lines."
        );
    }

    #[test]
    fn paragraph_breaks_gain_periods() {
        let text = "First paragraph without ending\n\nSecond paragraph here.";
        let cleaned = clean_plain_text(text);
        assert!(cleaned.contains("First paragraph without ending."));
    }

    #[test]
    fn format_names_are_stable() {
        assert_eq!(MarkupFormat::AsciiDoc.name(), "asciidoc");
        assert_eq!(MarkupFormat::ReStructuredText.name(), "restructuredtext");
    }
}
