//! Per-file classification: ignore, plain text, markup or code
//!
//! Classification is a pure function of file name, extension, size and a
//! bounded content sniff, so identical bytes under the same name always
//! classify the same way. Non-code files over the 1 MiB ceiling are
//! classified Ignore without their content ever being read in full.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::textnorm::MarkupFormat;

/// Non-code files larger than this are never processed
pub const MAX_DOC_BYTES: u64 = 1024 * 1024;

/// How much of the file the sniff may read
const SNIFF_BYTES: usize = 512;

/// Classification outcome for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Ignore,
    PlainText,
    Markup(MarkupFormat),
    Code(CodeLang),
}

/// The analyzed language family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLang {
    Python,
}

impl CodeLang {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "Python",
        }
    }
}

/// Extensions of files that are never worth reading: compiled artifacts,
/// archives, media, fonts and similar binary payloads.
const IGNORED_EXTENSIONS: &[&str] = &[
    "pyc", "pyo", "o", "a", "so", "dylib", "dll", "exe", "class", "jar",
    "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "whl", "egg",
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "tiff", "webp",
    "pdf", "ps", "eps", "ttf", "otf", "woff", "woff2", "eot",
    "mp3", "mp4", "avi", "mov", "wav", "ogg", "flac",
    "db", "sqlite", "sqlite3", "bin", "dat", "pickle", "pkl",
];

const IGNORED_NAMES: &[&str] = &[".ds_store", "thumbs.db", "desktop.ini"];

const PURETEXT_EXTENSIONS: &[&str] = &["txt", "text", "log"];

/// Extensionless basenames that are conventionally prose
const TEXT_BASENAMES: &[&str] = &[
    "license", "copying", "changelog", "changes", "authors", "notice",
    "install", "todo", "news", "thanks", "contributors",
];

/// Decide how a file should be processed.
///
/// `size` comes from the directory entry's metadata; only the sniff below
/// touches the file's content, and only its first [`SNIFF_BYTES`] bytes.
pub fn classify(path: &Path, size: u64) -> FileKind {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let basename = filename
        .strip_suffix(&format!(".{extension}"))
        .unwrap_or(&filename);

    if IGNORED_NAMES.contains(&filename.as_str())
        || IGNORED_EXTENSIONS.contains(&extension.as_str())
    {
        return FileKind::Ignore;
    }

    // Code first: recognized code files are exempt from the size ceiling.
    if extension == "py" || extension == "wsgi" {
        return FileKind::Code(CodeLang::Python);
    }
    if extension.is_empty() && hashbang_mentions_python(path) {
        return FileKind::Code(CodeLang::Python);
    }

    if size > MAX_DOC_BYTES {
        return FileKind::Ignore;
    }

    if let Some(format) = markup_format(&extension) {
        return FileKind::Markup(format);
    }

    if PURETEXT_EXTENSIONS.contains(&extension.as_str())
        || is_readme(basename)
        || TEXT_BASENAMES.contains(&basename)
    {
        return FileKind::PlainText;
    }

    match sniff(path) {
        Sniff::Text => FileKind::PlainText,
        Sniff::Binary | Sniff::Unreadable => FileKind::Ignore,
    }
}

/// Map a markup extension to its format variant
pub fn markup_format(extension: &str) -> Option<MarkupFormat> {
    match extension {
        "md" | "markdown" | "mdwn" | "mkdn" | "mdown" => Some(MarkupFormat::Markdown),
        "htm" | "html" | "xhtml" => Some(MarkupFormat::Html),
        "asciidoc" | "adoc" | "asc" => Some(MarkupFormat::AsciiDoc),
        "rst" => Some(MarkupFormat::ReStructuredText),
        "rtf" => Some(MarkupFormat::Rtf),
        "textile" => Some(MarkupFormat::Textile),
        _ => None,
    }
}

fn is_readme(basename: &str) -> bool {
    basename.contains("readme") || basename.contains("read me")
}

enum Sniff {
    Text,
    Binary,
    Unreadable,
}

/// Peek at the first bytes: a NUL byte or badly broken UTF-8 means binary
fn sniff(path: &Path) -> Sniff {
    let mut buf = [0u8; SNIFF_BYTES];
    let n = match File::open(path).and_then(|mut f| f.read(&mut buf)) {
        Ok(n) => n,
        Err(_) => return Sniff::Unreadable,
    };
    let head = &buf[..n];
    if head.contains(&0) {
        return Sniff::Binary;
    }
    // A truncated trailing multibyte sequence is fine; interior garbage
    // is not.
    match std::str::from_utf8(head) {
        Ok(_) => Sniff::Text,
        Err(e) if e.valid_up_to() + 4 >= head.len() => Sniff::Text,
        Err(_) => Sniff::Binary,
    }
}

/// Extensionless executables are often Python scripts; the hashbang says so
fn hashbang_mentions_python(path: &Path) -> bool {
    let mut buf = [0u8; 64];
    let n = match File::open(path).and_then(|mut f| f.read(&mut buf)) {
        Ok(n) => n,
        Err(_) => return false,
    };
    let head = String::from_utf8_lossy(&buf[..n]);
    let first_line = head.lines().next().unwrap_or("");
    first_line.starts_with("#!") && first_line.contains("python")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn python_extensions_classify_as_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.py");
        fs::write(&path, "print('hi')\n").unwrap();
        assert_eq!(classify(&path, 12), FileKind::Code(CodeLang::Python));
    }

    #[test]
    fn oversized_python_is_still_code() {
        // Size ceiling applies only to non-code files; no content read needed.
        let path = Path::new("huge.py");
        assert_eq!(
            classify(path, MAX_DOC_BYTES * 3),
            FileKind::Code(CodeLang::Python)
        );
    }

    #[test]
    fn oversized_document_is_ignored_without_reading() {
        // The path does not even exist; size alone decides.
        let path = Path::new("giant.md");
        assert_eq!(classify(path, MAX_DOC_BYTES + 1), FileKind::Ignore);
    }

    #[test]
    fn markup_extensions_map_to_formats() {
        assert_eq!(markup_format("md"), Some(MarkupFormat::Markdown));
        assert_eq!(markup_format("html"), Some(MarkupFormat::Html));
        assert_eq!(markup_format("adoc"), Some(MarkupFormat::AsciiDoc));
        assert_eq!(markup_format("rst"), Some(MarkupFormat::ReStructuredText));
        assert_eq!(markup_format("rtf"), Some(MarkupFormat::Rtf));
        assert_eq!(markup_format("textile"), Some(MarkupFormat::Textile));
        assert_eq!(markup_format("py"), None);
    }

    #[test]
    fn readme_basenames_are_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README");
        fs::write(&path, "A project readme.\n").unwrap();
        assert_eq!(classify(&path, 18), FileKind::PlainText);
        let md = dir.path().join("README.md");
        fs::write(&md, "# Title\n").unwrap();
        assert_eq!(classify(&md, 8), FileKind::Markup(MarkupFormat::Markdown));
    }

    #[test]
    fn binary_artifacts_are_ignored_by_extension() {
        assert_eq!(classify(Path::new("lib.so"), 100), FileKind::Ignore);
        assert_eq!(classify(Path::new("archive.tgz"), 100), FileKind::Ignore);
        assert_eq!(classify(Path::new("photo.JPG"), 100), FileKind::Ignore);
    }

    #[test]
    fn binary_content_is_sniffed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.unknownext");
        fs::write(&path, b"\x7fELF\x02\x01\x01\x00\x00\x00").unwrap();
        assert_eq!(classify(&path, 10), FileKind::Ignore);
    }

    #[test]
    fn texty_unknown_extensions_pass_the_sniff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.unknownext");
        fs::write(&path, "just ordinary prose in here\n").unwrap();
        assert_eq!(classify(&path, 28), FileKind::PlainText);
    }

    #[test]
    fn hashbang_scripts_without_extension_are_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner");
        fs::write(&path, "#!/usr/bin/env python\nprint('x')\n").unwrap();
        assert_eq!(classify(&path, 33), FileKind::Code(CodeLang::Python));
    }

    #[test]
    fn classification_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "Title\n=====\n").unwrap();
        let first = classify(&path, 12);
        for _ in 0..5 {
            assert_eq!(classify(&path, 12), first);
        }
    }
}
