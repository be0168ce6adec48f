//! Batch coordination across repository roots
//!
//! Fans a batch of roots out over a fixed-size worker pool. Each root is
//! walked independently; one failing root never poisons its batch mates,
//! and results come back in submission order regardless of which worker
//! finished first.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cache::NodeCache;
use crate::error::{ExtractError, Result};
use crate::exclusions::ExclusionSet;
use crate::schema::Node;
use crate::walker::TreeWalker;

/// Worker count used when the caller does not choose one
pub const DEFAULT_POOL_SIZE: usize = 4;

/// The result of extracting one root out of a batch
#[derive(Debug)]
pub struct RootOutcome {
    /// The root path as submitted
    pub root: PathBuf,
    pub result: Result<Node>,
}

/// Drives extraction of whole batches over a bounded worker pool
#[derive(Debug)]
pub struct ExtractionCoordinator {
    pool: rayon::ThreadPool,
    exclusions: Arc<ExclusionSet>,
    cache: Option<NodeCache>,
    recompute: bool,
}

impl ExtractionCoordinator {
    /// Build a coordinator with `pool_size` workers. Zero workers is a
    /// configuration error.
    pub fn new(pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(ExtractError::InvalidPoolSize { size: pool_size });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(pool_size)
            .build()
            .map_err(|_| ExtractError::InvalidPoolSize { size: pool_size })?;
        Ok(Self {
            pool,
            exclusions: Arc::new(ExclusionSet::standard()),
            cache: None,
            recompute: false,
        })
    }

    /// Use an on-disk cache for every walked root
    pub fn with_cache(mut self, cache: NodeCache, recompute: bool) -> Self {
        self.cache = Some(cache);
        self.recompute = recompute;
        self
    }

    /// Extract a single root
    pub fn extract(&self, root: &std::path::Path) -> Result<Node> {
        let walker = self.walker();
        self.pool.install(|| walker.walk(root))
    }

    /// Extract every root in the batch.
    ///
    /// Outcomes are returned in the order the roots were submitted. A root
    /// that fails contributes an error outcome; the rest still complete.
    pub fn extract_all(&self, roots: &[PathBuf]) -> Vec<RootOutcome> {
        info!(batch = roots.len(), "extracting batch");
        let walker = self.walker();
        self.pool.install(|| {
            roots
                .par_iter()
                .map(|root| {
                    let result = walker.walk(root);
                    if let Err(e) = &result {
                        warn!(root = %root.display(), "root failed: {e}");
                    }
                    RootOutcome {
                        root: root.clone(),
                        result,
                    }
                })
                .collect()
        })
    }

    fn walker(&self) -> TreeWalker<'_> {
        let walker = TreeWalker::new(Arc::clone(&self.exclusions));
        match &self.cache {
            Some(cache) => walker.with_cache(cache, self.recompute),
            None => walker,
        }
    }
}
