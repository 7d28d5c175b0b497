//! Diff Engine
//!
//! Four-way set/map difference between an observed snapshot and its stored
//! baseline. Persisted field names keep the inventory vocabulary: "missing from
//! fs" means present only in the baseline, "missing from inventory" means
//! present only in the observed snapshot.

use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::types::{self, Fixity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Discrepancy between one observed snapshot and its baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    #[serde(rename = "path")]
    pub logical_path: String,
    /// New directories
    #[serde(rename = "directories_missing_from_inventory")]
    pub directories_missing_from_baseline: BTreeSet<String>,
    /// Deleted directories
    #[serde(rename = "directories_missing_from_fs")]
    pub directories_missing_from_observed: BTreeSet<String>,
    /// New files
    #[serde(rename = "files_missing_from_inventory")]
    pub files_missing_from_baseline: BTreeMap<String, Fixity>,
    /// Deleted files
    #[serde(rename = "files_missing_from_fs")]
    pub files_missing_from_observed: BTreeMap<String, Fixity>,
    /// Changed files: name -> (baseline fixity, observed fixity)
    #[serde(rename = "file_fixity_mismatch")]
    pub fixity_mismatch: BTreeMap<String, (Fixity, Fixity)>,
    #[serde(rename = "timestamp")]
    pub generated_at: Timestamp,
}

impl Diff {
    /// Compare `observed` against `baseline`. Both must describe the same logical path.
    pub fn between(observed: &Snapshot, baseline: &Snapshot) -> Result<Self, InventoryError> {
        if observed.logical_path() != baseline.logical_path() {
            return Err(InventoryError::PathMismatch {
                observed: observed.logical_path().to_string(),
                baseline: baseline.logical_path().to_string(),
            });
        }

        let observed_dirs = observed.directory_names();
        let baseline_dirs = baseline.directory_names();
        let observed_files = observed.file_digests();
        let baseline_files = baseline.file_digests();

        let fixity_mismatch = baseline_files
            .iter()
            .filter_map(|(name, before)| match observed_files.get(name) {
                Some(after) if after != before => {
                    Some((name.clone(), (before.clone(), after.clone())))
                }
                _ => None,
            })
            .collect();

        Ok(Self {
            logical_path: observed.logical_path().to_string(),
            directories_missing_from_baseline: observed_dirs
                .difference(baseline_dirs)
                .cloned()
                .collect(),
            directories_missing_from_observed: baseline_dirs
                .difference(observed_dirs)
                .cloned()
                .collect(),
            files_missing_from_baseline: entries_missing_from(observed_files, baseline_files),
            files_missing_from_observed: entries_missing_from(baseline_files, observed_files),
            fixity_mismatch,
            generated_at: types::now(),
        })
    }

    /// True unless all five difference collections are empty
    pub fn has_changes(&self) -> bool {
        !(self.directories_missing_from_baseline.is_empty()
            && self.directories_missing_from_observed.is_empty()
            && self.files_missing_from_baseline.is_empty()
            && self.files_missing_from_observed.is_empty()
            && self.fixity_mismatch.is_empty())
    }

    /// Total number of discrepancies across all categories
    pub fn change_count(&self) -> usize {
        self.directories_missing_from_baseline.len()
            + self.directories_missing_from_observed.len()
            + self.files_missing_from_baseline.len()
            + self.files_missing_from_observed.len()
            + self.fixity_mismatch.len()
    }
}

/// Convenience wrapper for [`Diff::between`]
pub fn diff(observed: &Snapshot, baseline: &Snapshot) -> Result<Diff, InventoryError> {
    Diff::between(observed, baseline)
}

/// Entries of `these` whose name is absent from `those`
fn entries_missing_from(
    these: &BTreeMap<String, Fixity>,
    those: &BTreeMap<String, Fixity>,
) -> BTreeMap<String, Fixity> {
    these
        .iter()
        .filter(|(name, _)| !those.contains_key(*name))
        .map(|(name, fixity)| (name.clone(), fixity.clone()))
        .collect()
}
