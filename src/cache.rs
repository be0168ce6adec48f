//! On-disk node-tree cache
//!
//! One JSON file per repository root, named by the FNV-1a hash of the
//! root's absolute path. There is deliberately no freshness check against
//! the underlying files: a present entry is returned as-is, and the
//! `recompute` flag is the caller's only invalidation tool. Workers write
//! distinct files, so no locking is needed across the pool.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::schema::Node;

// FNV-1a constants for a 64-bit hash
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Compute a stable FNV-1a hash
fn fnv1a_hash(data: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in data.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Cache of previously computed node trees, keyed by absolute root path
#[derive(Debug)]
pub struct NodeCache {
    dir: PathBuf,
}

impl NodeCache {
    /// Open (creating if needed) a cache under the given directory
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(|e| ExtractError::Cache {
            message: format!("cannot create cache dir {}: {e}", dir.display()),
        })?;
        Ok(Self { dir })
    }

    /// Open a cache under the platform default location
    pub fn open_default() -> Result<Self> {
        Self::open(default_cache_dir())
    }

    fn entry_path(&self, root: &Path) -> PathBuf {
        let key = fnv1a_hash(&root.to_string_lossy());
        self.dir.join(format!("{key:016x}.json"))
    }

    /// Fetch the cached tree for a root path, if one exists.
    ///
    /// A corrupt entry is treated as absent and logged; the caller will
    /// recompute and overwrite it.
    pub fn load(&self, root: &Path) -> Option<Node> {
        let path = self.entry_path(root);
        let data = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(node) => {
                debug!(root = %root.display(), "cache hit");
                Some(node)
            }
            Err(e) => {
                warn!(entry = %path.display(), "discarding corrupt cache entry: {e}");
                None
            }
        }
    }

    /// Store (or overwrite) the tree for a root path
    pub fn store(&self, root: &Path, node: &Node) -> Result<()> {
        let path = self.entry_path(root);
        let data = serde_json::to_string(node).map_err(|e| ExtractError::Cache {
            message: format!("cannot serialize tree for {}: {e}", root.display()),
        })?;
        fs::write(&path, data).map_err(|e| ExtractError::Cache {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
        debug!(root = %root.display(), "cached tree");
        Ok(())
    }
}

/// Platform cache directory: `$REPODISTILL_CACHE_DIR`, else the user cache
/// dir, else a temp-dir fallback.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPODISTILL_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(base) = dirs::cache_dir() {
        return base.join("repodistill");
    }
    std::env::temp_dir().join("repodistill")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeBody;

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::open(dir.path().to_path_buf()).unwrap();
        let root = Path::new("/srv/repositories/00/00/00/62");
        let tree = Node::directory("62", vec![Node::ignored("a.bin")]);

        assert!(cache.load(root).is_none());
        cache.store(root, &tree).unwrap();
        assert_eq!(cache.load(root), Some(tree));
    }

    #[test]
    fn store_overwrites_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::open(dir.path().to_path_buf()).unwrap();
        let root = Path::new("/srv/repositories/00/00/00/62");

        cache.store(root, &Node::directory("62", vec![])).unwrap();
        let updated = Node::directory(
            "62",
            vec![Node::file("notes.txt", NodeBody::Text("hi there".into()), Some("en".into()), None)],
        );
        cache.store(root, &updated).unwrap();
        assert_eq!(cache.load(root), Some(updated));
    }

    #[test]
    fn distinct_roots_use_distinct_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::open(dir.path().to_path_buf()).unwrap();
        cache
            .store(Path::new("/a"), &Node::directory("a", vec![]))
            .unwrap();
        cache
            .store(Path::new("/b"), &Node::directory("b", vec![]))
            .unwrap();
        assert_eq!(cache.load(Path::new("/a")).unwrap().name, "a");
        assert_eq!(cache.load(Path::new("/b")).unwrap().name, "b");
    }

    #[test]
    fn corrupt_entries_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::open(dir.path().to_path_buf()).unwrap();
        let root = Path::new("/broken");
        fs::write(cache.entry_path(root), "not json at all").unwrap();
        assert!(cache.load(root).is_none());
    }
}
