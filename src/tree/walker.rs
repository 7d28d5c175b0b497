//! Directory listing and recursive tree walks
//!
//! `list_entries` reads the immediate children of a single directory. The
//! `TreeWalker` composes per-directory snapshots into a walk of a whole subtree.

use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::tree::builder::SnapshotBuilder;
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file, with its name as recorded and its on-disk path
    File { name: String, path: PathBuf },
    /// A sub-directory, with its name as recorded and its on-disk path
    Directory { name: String, path: PathBuf },
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::File { name, .. } | Entry::Directory { name, .. } => name,
        }
    }
}

/// Listing options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Treat symbolic links as the file or directory they point to (default: false,
    /// links are not inventoried)
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// List the immediate children of `dir`, sorted by name.
///
/// Symlinks (unless followed) and special files such as sockets, FIFOs and
/// devices are skipped.
pub fn list_entries(dir: &Path, config: &WalkerConfig) -> Result<Vec<Entry>, InventoryError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| InventoryError::ListingFailure {
            path: dir.to_path_buf(),
            source: std::io::Error::from(e),
        })?;

        let name = entry.file_name().to_str().ok_or_else(|| {
            InventoryError::InvalidPath(format!("Non UTF-8 name {:?} in {:?}", entry.file_name(), dir))
        })?;
        let name = path::normalize_name(name);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            entries.push(Entry::Directory {
                name,
                path: entry.into_path(),
            });
        } else if file_type.is_file() {
            entries.push(Entry::File {
                name,
                path: entry.into_path(),
            });
        } else {
            debug!(path = %entry.path().display(), "Skipping non-regular entry");
        }
    }

    Ok(entries)
}

/// Recursive walker producing one snapshot per visited directory
pub struct TreeWalker {
    builder: SnapshotBuilder,
}

impl TreeWalker {
    pub fn new(builder: SnapshotBuilder) -> Self {
        Self { builder }
    }

    /// Snapshot `start` and every directory below it, in pre-order by name.
    ///
    /// When `start` is not `root`, a non-recursive snapshot of its parent is
    /// appended: a directory's own addition or removal is only visible from the
    /// parent's listing. A `start` that no longer exists yields only that parent
    /// snapshot. Any failure aborts the whole walk.
    #[instrument(skip(self), fields(start = %start.display(), root = %root.display()))]
    pub fn walk(&self, start: &Path, root: &Path) -> Result<Vec<Snapshot>, InventoryError> {
        let began = Instant::now();
        let root = path::canonicalize_path(root)?;
        let start = path::resolve_path(start)?;
        // Rejects a start outside the root before touching the filesystem.
        let start_logical = path::logical_path(&start, &root)?;
        info!(logical_path = %start_logical, "Starting inventory walk");

        let mut snapshots = Vec::new();
        if start != root && !start.exists() {
            warn!(logical_path = %start_logical, "Start directory no longer exists, scanning parent only");
        } else {
            if !start.is_dir() {
                return Err(InventoryError::InvalidPath(format!(
                    "{:?} is not a directory",
                    start
                )));
            }
            let mut pending = vec![start.clone()];
            while let Some(dir) = pending.pop() {
                let (snapshot, children) = self.builder.scan(&dir, &root)?;
                pending.extend(children.into_iter().rev());
                snapshots.push(snapshot);
            }
        }

        if start != root {
            if let Some(parent) = start.parent() {
                snapshots.push(self.builder.build(parent, &root)?);
            }
        }

        info!(
            snapshot_count = snapshots.len(),
            duration_ms = began.elapsed().as_millis(),
            "Inventory walk completed"
        );
        Ok(snapshots)
    }
}
