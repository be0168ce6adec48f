//! Repository storage layout

use std::path::{Path, PathBuf};

/// Resolve a repository identifier to its on-disk location.
///
/// Numeric identifiers are zero-padded to eight digits and sharded into
/// four two-digit segments, so repository 62 lives at `00/00/00/62`.
/// Anything non-numeric is taken as a plain directory name under the root.
pub fn repo_path(root: &Path, id: &str) -> PathBuf {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && id.len() <= 8 {
        let padded = format!("{id:0>8}");
        let mut path = root.to_path_buf();
        for segment in [&padded[0..2], &padded[2..4], &padded[4..6], &padded[6..8]] {
            path.push(segment);
        }
        path
    } else {
        root.join(id)
    }
}
