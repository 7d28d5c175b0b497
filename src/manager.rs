//! Inventory manager: change detection and inventory updates for one file system.

use crate::config::{FileSystemConfig, FixityConfig};
use crate::diff::Diff;
use crate::error::InventoryError;
use crate::reconcile::Reconciler;
use crate::report::Report;
use crate::store::{FileSnapshotStore, SnapshotStore};
use crate::tree::{path, SnapshotBuilder, TreeWalker, WalkerConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

/// Detects drift under a file system root and folds accepted reports into its store.
pub struct InventoryManager<S: SnapshotStore = FileSnapshotStore> {
    fs_base_path: PathBuf,
    store: S,
    walker: TreeWalker,
}

impl InventoryManager<FileSnapshotStore> {
    pub fn new(
        fs_base_path: impl Into<PathBuf>,
        inventory_base_path: impl AsRef<Path>,
        concurrency: usize,
        walker_config: WalkerConfig,
    ) -> Self {
        let builder = SnapshotBuilder::new(concurrency).with_walker_config(walker_config);
        Self::with_store(
            fs_base_path,
            FileSnapshotStore::new(inventory_base_path),
            TreeWalker::new(builder),
        )
    }

    pub fn from_config(file_system: &FileSystemConfig, config: &FixityConfig) -> Self {
        Self::new(
            file_system.fs_base_path.clone(),
            &file_system.inventory_base_path,
            config.fixity_threads,
            config.walker.clone(),
        )
    }

    /// Build the inventory from scratch: wipe any existing records, scan the whole
    /// tree and apply the result.
    ///
    /// Refuses to touch an existing inventory directory unless `exists_ok`.
    #[instrument(skip(self), fields(fs_base_path = %self.fs_base_path.display()))]
    pub fn populate(&self, exists_ok: bool) -> Result<Report, InventoryError> {
        let inventory_root = self.store.root();
        if inventory_root.exists() {
            if !exists_ok {
                return Err(InventoryError::io(
                    inventory_root,
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "inventory already exists (pass --exists-ok to rebuild it)",
                    ),
                ));
            }
            info!(inventory = %inventory_root.display(), "Removing existing inventory");
            fs::remove_dir_all(inventory_root).map_err(|e| InventoryError::io(inventory_root, e))?;
        }

        let mut report = self.detect_change(&self.fs_base_path)?;
        self.update_inventory(&mut report)?;
        Ok(report)
    }
}

impl<S: SnapshotStore> InventoryManager<S> {
    pub fn with_store(fs_base_path: impl Into<PathBuf>, store: S, walker: TreeWalker) -> Self {
        Self {
            fs_base_path: fs_base_path.into(),
            store,
            walker,
        }
    }

    pub fn fs_base_path(&self) -> &Path {
        &self.fs_base_path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compare `path` (and its parent) against the recorded inventory.
    ///
    /// The store is only read. The returned report holds one diff per directory
    /// that changed.
    #[instrument(skip(self), fields(path = %start.display()))]
    pub fn detect_change(&self, start: &Path) -> Result<Report, InventoryError> {
        let started = Instant::now();
        let start = path::resolve_path(start)?;
        let mut report = Report::new(start.display().to_string());

        let snapshots = self.walker.walk(&start, &self.fs_base_path)?;
        let scanned = snapshots.len();
        for observed in &snapshots {
            let baseline = self.store.read_or_empty(observed.logical_path())?;
            report.push(Diff::between(observed, &baseline)?);
        }

        info!(
            directories = scanned,
            changed = report.diffs.len(),
            duration_ms = started.elapsed().as_millis(),
            "Change detection complete"
        );
        Ok(report)
    }

    /// Apply every diff in `report` to the store and mark it applied.
    ///
    /// The report's start path must lie under this manager's root. A report is
    /// applied at most once. On error the store is unchanged.
    #[instrument(skip(self, report), fields(base_path = %report.base_path, diffs = report.diffs.len()))]
    pub fn update_inventory(&self, report: &mut Report) -> Result<Vec<PathBuf>, InventoryError> {
        if report.is_applied() {
            return Err(InventoryError::AlreadyApplied {
                base_path: report.base_path.clone(),
            });
        }
        if !within_root(Path::new(&report.base_path), &self.fs_base_path) {
            return Err(InventoryError::PathMismatch {
                observed: report.base_path.clone(),
                baseline: self.fs_base_path.display().to_string(),
            });
        }

        let keys = Reconciler::new(&self.store).reconcile(&report.diffs)?;
        report.applied()?;
        info!(records = keys.len(), "Inventory updated");
        Ok(keys)
    }
}

/// Whether `start` is `root` or below it, compared raw first and then canonically.
fn within_root(start: &Path, root: &Path) -> bool {
    if start.starts_with(root) {
        return true;
    }
    match (path::resolve_path(start), path::canonicalize_path(root)) {
        (Ok(start), Ok(root)) => start.starts_with(root),
        _ => false,
    }
}
