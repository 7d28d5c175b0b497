//! Inventory Store
//!
//! Content-addressed storage of baseline snapshots. A logical path maps to a
//! sharded storage key derived from the SHA-256 of the path, so lookups need no
//! separate index. Only the latest generation per logical path is kept.

pub mod persistence;

pub use persistence::FileSnapshotStore;

use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::tree::hasher;
use std::path::PathBuf;

/// Width of each shard segment, in hex characters.
pub const SHARD_WIDTH: usize = 8;

/// Number of nested shard directories.
pub const SHARD_DEPTH: usize = 8;

/// Derive the storage key for a logical path.
///
/// Key structure: `{d[0..8]}/{d[8..16]}/.../{d[56..64]}/{d}.json` where `d` is the
/// hex SHA-256 of the logical path.
pub fn locate(logical_path: &str) -> PathBuf {
    let digest = hasher::compute_path_digest(logical_path);
    let mut key = PathBuf::new();
    for shard in 0..SHARD_DEPTH {
        key.push(&digest[shard * SHARD_WIDTH..(shard + 1) * SHARD_WIDTH]);
    }
    key.push(format!("{}.json", digest));
    key
}

/// Snapshot Store interface
pub trait SnapshotStore {
    /// Storage key for a logical path, relative to the store root.
    fn locate(&self, logical_path: &str) -> PathBuf {
        locate(logical_path)
    }

    /// Read the baseline for a logical path; `NotFound` when none is recorded.
    fn read(&self, logical_path: &str) -> Result<Snapshot, InventoryError>;

    /// Persist a snapshot, replacing any previous generation. Returns its key.
    fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, InventoryError>;

    /// Read the baseline, treating a missing record as an empty snapshot.
    fn read_or_empty(&self, logical_path: &str) -> Result<Snapshot, InventoryError> {
        match self.read(logical_path) {
            Ok(snapshot) => Ok(snapshot),
            Err(InventoryError::NotFound { .. }) => Ok(Snapshot::empty(logical_path)),
            Err(e) => Err(e),
        }
    }
}
