//! Snapshot: the observed or recorded state of exactly one directory.

use crate::error::InventoryError;
use crate::types::{self, Fixity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immediate contents of one directory: sub-directory names and file fixities.
///
/// Serialized as the inventory record `{path, dirs, files, timestamp}`. A
/// snapshot is never mutated; reconciliation produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "path")]
    logical_path: String,
    #[serde(rename = "dirs")]
    directory_names: BTreeSet<String>,
    #[serde(rename = "files")]
    file_digests: BTreeMap<String, Fixity>,
    #[serde(rename = "timestamp")]
    generated_at: Timestamp,
}

impl Snapshot {
    /// Create a snapshot, rejecting a name listed as both file and directory.
    pub fn new(
        logical_path: impl Into<String>,
        directory_names: BTreeSet<String>,
        file_digests: BTreeMap<String, Fixity>,
        generated_at: Timestamp,
    ) -> Result<Self, InventoryError> {
        let snapshot = Self {
            logical_path: logical_path.into(),
            directory_names,
            file_digests,
            generated_at,
        };
        snapshot.check_disjoint()?;
        Ok(snapshot)
    }

    /// Snapshot with no directories or files, standing in for a missing baseline.
    pub fn empty(logical_path: impl Into<String>) -> Self {
        Self {
            logical_path: logical_path.into(),
            directory_names: BTreeSet::new(),
            file_digests: BTreeMap::new(),
            generated_at: types::now(),
        }
    }

    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    pub fn directory_names(&self) -> &BTreeSet<String> {
        &self.directory_names
    }

    pub fn file_digests(&self) -> &BTreeMap<String, Fixity> {
        &self.file_digests
    }

    pub fn generated_at(&self) -> Timestamp {
        self.generated_at
    }

    /// Same contents, ignoring when each snapshot was generated.
    pub fn same_contents(&self, other: &Snapshot) -> bool {
        self.logical_path == other.logical_path
            && self.directory_names == other.directory_names
            && self.file_digests == other.file_digests
    }

    pub(crate) fn check_disjoint(&self) -> Result<(), InventoryError> {
        match self
            .directory_names
            .iter()
            .find(|name| self.file_digests.contains_key(*name))
        {
            Some(name) => Err(InventoryError::NameCollision {
                path: self.logical_path.clone(),
                name: name.clone(),
            }),
            None => Ok(()),
        }
    }
}
