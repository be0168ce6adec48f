//! Recursive tree walker for one repository root
//!
//! Visits every entry under a root directory, classifies each file and
//! routes it into the source parser or the text normalizer, assembling the
//! recursive [`Node`] tree. Per-file failures degrade the single entry to
//! Ignored and the traversal continues; only an unusable root is an error.
//!
//! Child ordering follows filesystem enumeration order. It is not sorted,
//! so two runs on an unchanged tree agree with each other but different
//! filesystems may enumerate differently.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::NodeCache;
use crate::classify::{classify, CodeLang, FileKind};
use crate::error::{ExtractError, Result};
use crate::exclusions::ExclusionSet;
use crate::language::{human_language, majority_language};
use crate::parser::SourceParser;
use crate::schema::{Node, NodeBody};
use crate::textnorm::{clean_plain_text, normalize_document, MarkupFormat};

/// Walks one directory tree, producing its condensed node tree
pub struct TreeWalker<'c> {
    parser: SourceParser,
    cache: Option<&'c NodeCache>,
    recompute: bool,
}

impl<'c> TreeWalker<'c> {
    pub fn new(exclusions: Arc<ExclusionSet>) -> Self {
        Self {
            parser: SourceParser::new(exclusions),
            cache: None,
            recompute: false,
        }
    }

    /// Attach a cache. With `recompute` unset a present entry short-circuits
    /// the walk; with it set the entry is ignored and overwritten.
    pub fn with_cache(mut self, cache: &'c NodeCache, recompute: bool) -> Self {
        self.cache = Some(cache);
        self.recompute = recompute;
        self
    }

    /// Walk a repository root and return its node tree.
    ///
    /// The root must be an existing directory; anything else is a
    /// configuration error, not a degradable entry.
    pub fn walk(&self, root: &Path) -> Result<Node> {
        if !root.is_dir() {
            return Err(ExtractError::InvalidRoot {
                path: root.display().to_string(),
            });
        }
        let canonical = fs::canonicalize(root)?;

        if let Some(cache) = self.cache {
            if self.recompute {
                debug!(root = %canonical.display(), "recompute requested; skipping cache");
            } else if let Some(tree) = cache.load(&canonical) {
                return Ok(tree);
            }
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let mut visited = HashSet::new();
        visited.insert(canonical.clone());
        let tree = self.walk_dir(root, name, &mut visited)?;

        if let Some(cache) = self.cache {
            cache.store(&canonical, &tree)?;
        }
        Ok(tree)
    }

    fn walk_dir(&self, dir: &Path, name: String, visited: &mut HashSet<PathBuf>) -> Result<Node> {
        debug!(dir = %dir.display(), "walking directory");
        let mut children = Vec::new();

        // Enumeration order is whatever the filesystem hands back.
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), "unreadable directory entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            let entry_name = entry.file_name().to_string_lossy().into_owned();

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), "cannot stat entry: {e}");
                    children.push(Node::ignored(entry_name));
                    continue;
                }
            };

            if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
                // Cycle guard: canonical paths already seen are skipped, so
                // symlink loops terminate.
                match fs::canonicalize(&path) {
                    Ok(canonical) => {
                        if !visited.insert(canonical) {
                            warn!(path = %path.display(), "directory cycle detected; skipping");
                            continue;
                        }
                    }
                    Err(e) => {
                        warn!(path = %path.display(), "cannot canonicalize: {e}");
                        continue;
                    }
                }
                match self.walk_dir(&path, entry_name, visited) {
                    Ok(node) => children.push(node),
                    Err(e) => {
                        warn!(path = %path.display(), "subdirectory failed: {e}");
                    }
                }
            } else {
                children.push(self.file_node(&path, entry_name));
            }
        }

        Ok(Node::directory(name, children))
    }

    /// Produce the node for one file, degrading failures to Ignored
    fn file_node(&self, path: &Path, name: String) -> Node {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %path.display(), "cannot stat file: {e}");
                return Node::ignored(name);
            }
        };

        if size == 0 {
            debug!(path = %path.display(), "empty file");
            return Node::file(name, NodeBody::Text(String::new()), None, None);
        }

        match classify(path, size) {
            FileKind::Ignore => {
                debug!(path = %path.display(), "ignored file");
                Node::ignored(name)
            }
            FileKind::Code(lang) => self.code_node(path, name, lang),
            FileKind::PlainText => match self.read_text(path) {
                Some(raw) => {
                    let text = clean_plain_text(&raw);
                    let lang = human_language(&text);
                    Node::file(name, NodeBody::Text(text), Some(lang), None)
                }
                None => Node::ignored(name),
            },
            FileKind::Markup(format) => self.markup_node(path, name, format),
        }
    }

    fn code_node(&self, path: &Path, name: String, lang: CodeLang) -> Node {
        let Some(source) = self.read_text(path) else {
            return Node::ignored(name);
        };
        let record = self.parser.parse(&source);

        // One vote per fragment: header, comments, docstrings and each
        // distinct string literal.
        let fragments = std::iter::once(record.header.as_str())
            .chain(record.comments.iter().map(String::as_str))
            .chain(record.docstrings.iter().map(String::as_str))
            .chain(record.strings.keys().map(String::as_str));
        let text_language = majority_language(fragments);

        Node::file(
            name,
            NodeBody::Code(Box::new(record)),
            Some(text_language),
            Some(lang.name().to_string()),
        )
    }

    fn markup_node(&self, path: &Path, name: String, format: MarkupFormat) -> Node {
        let Some(raw) = self.read_text(path) else {
            return Node::ignored(name);
        };
        match normalize_document(&raw, format) {
            Ok(text) => {
                let lang = human_language(&text);
                Node::file(name, NodeBody::Text(text), Some(lang), None)
            }
            Err(e) => {
                warn!(path = %path.display(), "conversion failed: {e}");
                Node::ignored(name)
            }
        }
    }

    /// Read a file as text, replacing invalid UTF-8 rather than failing
    fn read_text(&self, path: &Path) -> Option<String> {
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!(path = %path.display(), "unreadable file: {e}");
                None
            }
        }
    }
}
