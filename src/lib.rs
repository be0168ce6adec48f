//! repodistill: repository structure extractor
//!
//! This library condenses a repository's directory tree into a structured
//! summary. Python sources are parsed with tree-sitter into counted name
//! tables, documentation in common markup formats is normalized to plain
//! text, and every textual fragment is tagged with its detected human
//! language. Whole batches of repositories can be extracted concurrently
//! over a bounded worker pool, with results cached on disk per root.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use repodistill::{ExclusionSet, TreeWalker};
//!
//! let walker = TreeWalker::new(Arc::new(ExclusionSet::standard()));
//! let tree = walker.walk(Path::new("/srv/repos/00/00/00/62"))?;
//! println!("{}", serde_json::to_string_pretty(&tree)?);
//! ```

pub mod cache;
pub mod classify;
pub mod cli;
pub mod coordinator;
pub mod error;
pub mod exclusions;
pub mod idents;
pub mod language;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod textnorm;
pub mod walker;
pub mod words;

// Re-export commonly used types
pub use cache::NodeCache;
pub use classify::{classify, CodeLang, FileKind, MAX_DOC_BYTES};
pub use cli::Cli;
pub use coordinator::{ExtractionCoordinator, RootOutcome, DEFAULT_POOL_SIZE};
pub use error::{ExtractError, Result};
pub use exclusions::ExclusionSet;
pub use idents::{all_identifiers, naive_camelcase_split};
pub use language::{human_language, majority_language, DEFAULT_LANGUAGE};
pub use parser::SourceParser;
pub use paths::repo_path;
pub use schema::{CodeRecord, CountedNames, Node, NodeBody, NodeKind};
pub use textnorm::{clean_plain_text, normalize_document, MarkupFormat};
pub use walker::TreeWalker;
pub use words::{all_words, extract_text_words, WordFilter};
