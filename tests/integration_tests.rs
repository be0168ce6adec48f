//! Integration tests for repodistill
//!
//! These tests verify end-to-end behavior across multiple modules: the
//! walker over realistic repository layouts, the batch coordinator, the
//! cache, and the flattened word and identifier views. Fixtures are built
//! with tempfile rather than checked-in trees.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use repodistill::{
    all_identifiers, all_words, ExclusionSet, ExtractError, ExtractionCoordinator, Node, NodeBody,
    NodeCache, NodeKind, TreeWalker, WordFilter,
};

fn walker() -> TreeWalker<'static> {
    TreeWalker::new(Arc::new(ExclusionSet::standard()))
}

fn child<'n>(node: &'n Node, name: &str) -> &'n Node {
    match &node.body {
        NodeBody::Children(children) => children
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no child named {name}")),
        _ => panic!("{} is not a directory node", node.name),
    }
}

/// Build a small but realistic project layout
fn sample_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(
        root.join("README.md"),
        "# Sample project\n\nThis project scans repositories and writes reports.\n",
    )
    .unwrap();
    fs::write(
        root.join("LICENSE"),
        "Permission is hereby granted, free of charge, to any person.\n",
    )
    .unwrap();

    fs::create_dir(root.join("src")).unwrap();
    fs::write(
        root.join("src").join("scanner.py"),
        concat!(
            "#!/usr/bin/env python\n",
            "'''Scanning helpers for the report pipeline.'''\n",
            "\n",
            "import os\n",
            "\n",
            "class Scanner:\n",
            "    def scan_tree(self, root_dir):\n",
            "        entries = list_entries(root_dir)\n",
            "        write_report(entries)\n",
        ),
    )
    .unwrap();
    fs::write(root.join("src").join("__init__.py"), "").unwrap();

    fs::create_dir(root.join("build")).unwrap();
    fs::write(root.join("build").join("scanner.pyc"), b"\x00\x03binary").unwrap();

    dir
}

#[test]
fn walker_builds_the_expected_tree_shape() {
    let repo = sample_repo();
    let tree = walker().walk(repo.path()).unwrap();
    assert_eq!(tree.kind, NodeKind::Directory);

    let readme = child(&tree, "README.md");
    match &readme.body {
        NodeBody::Text(text) => {
            assert!(text.contains("Sample project"));
            assert!(!text.contains('#'), "markup should be stripped: {text}");
        }
        other => panic!("expected text body, got {other:?}"),
    }
    assert_eq!(readme.text_language.as_deref(), Some("en"));

    let license = child(&tree, "LICENSE");
    assert!(matches!(&license.body, NodeBody::Text(t) if t.contains("Permission")));

    let src = child(&tree, "src");
    let scanner = child(src, "scanner.py");
    assert_eq!(scanner.code_language.as_deref(), Some("Python"));
    match &scanner.body {
        NodeBody::Code(record) => {
            assert_eq!(record.header, "Scanning helpers for the report pipeline.");
            assert_eq!(record.imports.get("os"), Some(&1));
            assert_eq!(record.classes.get("Scanner"), Some(&1));
            assert_eq!(record.functions.get("Scanner.scan_tree"), Some(&1));
            assert_eq!(record.calls.get("list_entries"), Some(&1));
            assert_eq!(record.calls.get("write_report"), Some(&1));
        }
        other => panic!("expected code body, got {other:?}"),
    }

    // Empty files keep a text body with no language tags.
    let init = child(src, "__init__.py");
    assert_eq!(init.body, NodeBody::Text(String::new()));
    assert!(init.text_language.is_none());

    // Compiled artifacts are ignored, not omitted.
    let build = child(&tree, "build");
    assert!(child(build, "scanner.pyc").is_ignored());
}

#[test]
fn tree_serializes_with_nulls_for_ignored_files() {
    let repo = sample_repo();
    let tree = walker().walk(repo.path()).unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    let build = json["body"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "build")
        .unwrap();
    let pyc = &build["body"].as_array().unwrap()[0];
    assert_eq!(pyc["name"], "scanner.pyc");
    assert!(pyc["body"].is_null());
    assert_eq!(pyc["type"], "file");
}

#[test]
fn repeated_walks_agree() {
    let repo = sample_repo();
    let first = walker().walk(repo.path()).unwrap();
    let second = walker().walk(repo.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cached_tree_round_trips_through_disk() {
    let repo = sample_repo();
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = NodeCache::open(cache_dir.path().to_path_buf()).unwrap();

    let computed = walker().with_cache(&cache, false).walk(repo.path()).unwrap();
    let reloaded = walker().with_cache(&cache, false).walk(repo.path()).unwrap();
    assert_eq!(computed, reloaded);

    let canonical = fs::canonicalize(repo.path()).unwrap();
    assert_eq!(cache.load(&canonical), Some(computed));
}

#[test]
fn coordinator_isolates_failures_and_keeps_order() {
    let good = sample_repo();
    let also_good = sample_repo();
    let roots = vec![
        good.path().to_path_buf(),
        PathBuf::from("/missing/repository"),
        also_good.path().to_path_buf(),
    ];

    let coordinator = ExtractionCoordinator::new(2).unwrap();
    let outcomes = coordinator.extract_all(&roots);

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1].root, roots[1]);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(ExtractError::InvalidRoot { .. })
    ));
    assert!(outcomes[2].result.is_ok());
}

#[test]
fn symlink_cycles_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("note.txt"), "a note inside the loop\n").unwrap();
    std::os::unix::fs::symlink(dir.path(), inner.join("loop")).unwrap();

    let tree = walker().walk(dir.path()).unwrap();
    let inner_node = child(&tree, "inner");
    assert!(matches!(
        &child(inner_node, "note.txt").body,
        NodeBody::Text(_)
    ));
}

#[test]
fn word_view_spans_text_and_code() {
    let repo = sample_repo();
    let tree = walker().walk(repo.path()).unwrap();

    let words = all_words(&tree, WordFilter::All);
    assert!(words.contains(&"scans".to_string()), "readme words: {words:?}");
    assert!(words.contains(&"scanning".to_string()), "docstring words: {words:?}");

    let text_only = all_words(&tree, WordFilter::Text);
    assert!(text_only.contains(&"scans".to_string()));
    assert!(!text_only.contains(&"scanning".to_string()));

    let code_only = all_words(&tree, WordFilter::Code);
    assert!(code_only.contains(&"scanning".to_string()));
    assert!(!code_only.contains(&"scans".to_string()));
}

#[test]
fn identifier_view_is_flat_and_distinct() {
    let repo = sample_repo();
    let tree = walker().walk(repo.path()).unwrap();
    let idents = all_identifiers(&tree);
    assert!(idents.contains(&"Scanner".to_string()));
    assert!(idents.contains(&"Scanner.scan_tree".to_string()));
    assert!(idents.contains(&"list_entries".to_string()));
    let mut sorted = idents.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), idents.len(), "duplicates in {idents:?}");
}
