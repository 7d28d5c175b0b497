//! Filesystem persistence for the Snapshot Store

use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON-file implementation of SnapshotStore
///
/// Each record lives at `{root}/{storage key}`. Writes go to a `.tmp` sibling
/// first and are renamed into place, so a reader never sees a partial record.
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root path of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the record for a logical path
    pub fn record_path(&self, logical_path: &str) -> PathBuf {
        self.root.join(self.locate(logical_path))
    }

    /// Check whether a baseline exists for a logical path
    pub fn contains(&self, logical_path: &str) -> bool {
        self.record_path(logical_path).is_file()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, logical_path: &str) -> Result<Snapshot, InventoryError> {
        let record_path = self.record_path(logical_path);
        debug!(logical_path, record = %record_path.display(), "Reading inventory");

        let bytes = match fs::read(&record_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(InventoryError::NotFound {
                    path: logical_path.to_string(),
                })
            }
            Err(e) => return Err(InventoryError::io(&record_path, e)),
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| InventoryError::MalformedRecord {
                key: record_path.clone(),
                reason: e.to_string(),
            })?;

        if snapshot.logical_path() != logical_path {
            return Err(InventoryError::MalformedRecord {
                key: record_path,
                reason: format!(
                    "record is for {:?}, expected {:?}",
                    snapshot.logical_path(),
                    logical_path
                ),
            });
        }
        snapshot
            .check_disjoint()
            .map_err(|e| InventoryError::MalformedRecord {
                key: record_path,
                reason: e.to_string(),
            })?;

        Ok(snapshot)
    }

    fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, InventoryError> {
        let key = self.locate(snapshot.logical_path());
        let record_path = self.root.join(&key);
        let temp_path = record_path.with_extension("json.tmp");
        debug!(
            logical_path = snapshot.logical_path(),
            record = %record_path.display(),
            "Writing inventory"
        );

        if let Some(parent) = record_path.parent() {
            fs::create_dir_all(parent).map_err(|e| InventoryError::io(parent, e))?;
        }

        let serialized =
            serde_json::to_vec_pretty(snapshot).map_err(|e| InventoryError::MalformedRecord {
                key: record_path.clone(),
                reason: e.to_string(),
            })?;

        fs::write(&temp_path, &serialized).map_err(|e| InventoryError::io(&temp_path, e))?;
        fs::rename(&temp_path, &record_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            InventoryError::io(&record_path, e)
        })?;

        Ok(key)
    }
}
