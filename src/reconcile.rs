//! Reconciler: folds accepted diffs back into the baseline inventory.

use crate::diff::Diff;
use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::types::{self, Timestamp};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Apply `diff` to `baseline`, producing the next generation.
///
/// Inverse of [`Diff::between`]: `apply(b, &Diff::between(o, b)?, _)` has the same
/// contents as `o`. Every fixity mismatch must still find its recorded "before"
/// value in the baseline, otherwise the baseline changed since the diff was
/// produced and `StaleBaseline` is returned.
pub fn apply(
    baseline: &Snapshot,
    diff: &Diff,
    timestamp: Option<Timestamp>,
) -> Result<Snapshot, InventoryError> {
    if baseline.logical_path() != diff.logical_path {
        return Err(InventoryError::PathMismatch {
            observed: diff.logical_path.clone(),
            baseline: baseline.logical_path().to_string(),
        });
    }

    let mut directory_names = baseline.directory_names().clone();
    directory_names.extend(diff.directories_missing_from_baseline.iter().cloned());
    for name in &diff.directories_missing_from_observed {
        directory_names.remove(name);
    }

    let mut file_digests = baseline.file_digests().clone();
    file_digests.extend(
        diff.files_missing_from_baseline
            .iter()
            .map(|(name, fixity)| (name.clone(), fixity.clone())),
    );
    for name in diff.files_missing_from_observed.keys() {
        file_digests.remove(name);
    }

    for (name, (before, after)) in &diff.fixity_mismatch {
        match file_digests.get_mut(name) {
            Some(current) if current == before => *current = after.clone(),
            current => {
                return Err(InventoryError::StaleBaseline {
                    path: diff.logical_path.clone(),
                    name: name.clone(),
                    expected: before.clone(),
                    found: current.map(|c| c.clone()),
                })
            }
        }
    }

    Snapshot::new(
        diff.logical_path.clone(),
        directory_names,
        file_digests,
        timestamp.unwrap_or_else(types::now),
    )
}

/// Applies batches of diffs against a snapshot store
pub struct Reconciler<'a, S: SnapshotStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SnapshotStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Compute the next generation for every diff without writing anything.
    ///
    /// Each diff is replayed with its own timestamp.
    pub fn prepare(&self, diffs: &[Diff]) -> Result<Vec<Snapshot>, InventoryError> {
        diffs
            .iter()
            .map(|diff| {
                let baseline = self.store.read_or_empty(&diff.logical_path)?;
                apply(&baseline, diff, Some(diff.generated_at)).map_err(|e| {
                    warn!(logical_path = %diff.logical_path, error = %e, "Cannot reconcile");
                    e
                })
            })
            .collect()
    }

    /// Reconcile all diffs into the store.
    ///
    /// Every next generation is computed before the first write, so a stale or
    /// malformed baseline leaves the store untouched.
    #[instrument(skip(self, diffs), fields(diff_count = diffs.len()))]
    pub fn reconcile(&self, diffs: &[Diff]) -> Result<Vec<PathBuf>, InventoryError> {
        let updated = self.prepare(diffs)?;
        let mut keys = Vec::with_capacity(updated.len());
        for snapshot in &updated {
            info!(logical_path = %snapshot.logical_path(), "Updating inventory");
            keys.push(self.store.write(snapshot)?);
        }
        Ok(keys)
    }
}
