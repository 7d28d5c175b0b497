//! Snapshot builder: one directory's listing plus parallel file hashing

use crate::error::InventoryError;
use crate::snapshot::Snapshot;
use crate::tree::hasher;
use crate::tree::path;
use crate::tree::walker::{self, Entry, WalkerConfig};
use crate::types::{self, Fixity};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Builds the snapshot of a single directory.
///
/// Files are hashed on a rayon pool of at most `concurrency` threads. The set of files
/// is fixed by the initial listing; files created during the scan are not seen.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    concurrency: usize,
    walker_config: WalkerConfig,
}

impl SnapshotBuilder {
    /// Create a builder hashing up to `concurrency` files at once (minimum 1)
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            walker_config: WalkerConfig::default(),
        }
    }

    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Snapshot the immediate contents of `dir`, recorded relative to `root`.
    pub fn build(&self, dir: &Path, root: &Path) -> Result<Snapshot, InventoryError> {
        let root = path::canonicalize_path(root)?;
        let dir = path::canonicalize_path(dir)?;
        self.scan(&dir, &root).map(|(snapshot, _)| snapshot)
    }

    /// Snapshot `dir` and return the on-disk paths of its sub-directories.
    ///
    /// Both paths must already be canonical.
    #[instrument(skip(self, root), fields(dir = %dir.display()))]
    pub(crate) fn scan(
        &self,
        dir: &Path,
        root: &Path,
    ) -> Result<(Snapshot, Vec<PathBuf>), InventoryError> {
        let started = Instant::now();
        let logical_path = path::logical_path(dir, root)?;
        let entries = walker::list_entries(dir, &self.walker_config)?;

        let mut directory_names = BTreeSet::new();
        let mut subdirectories = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Entry::Directory { name, path } => {
                    if !directory_names.insert(name.clone()) {
                        return Err(InventoryError::NameCollision {
                            path: logical_path,
                            name,
                        });
                    }
                    subdirectories.push(path);
                }
                Entry::File { name, path } => files.push((name, path)),
            }
        }

        let file_digests = self.hash_files(&logical_path, files)?;
        let snapshot = Snapshot::new(logical_path, directory_names, file_digests, types::now())?;

        debug!(
            logical_path = %snapshot.logical_path(),
            dir_count = snapshot.directory_names().len(),
            file_count = snapshot.file_digests().len(),
            duration_ms = started.elapsed().as_millis(),
            "Built snapshot"
        );
        Ok((snapshot, subdirectories))
    }

    /// Hash every listed file, failing on the first unreadable file in listing order.
    ///
    /// Every file is hashed before any error is returned.
    fn hash_files(
        &self,
        logical_path: &str,
        files: Vec<(String, PathBuf)>,
    ) -> Result<BTreeMap<String, Fixity>, InventoryError> {
        if files.is_empty() {
            return Ok(BTreeMap::new());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency.min(files.len()))
            .thread_name(|i| format!("fixity-hash-{}", i))
            .build()
            .map_err(|e| InventoryError::WorkerPool(e.to_string()))?;

        let outcomes: Vec<Result<Fixity, InventoryError>> = pool.install(|| {
            files
                .par_iter()
                .map(|(name, file_path)| {
                    let outcome = hasher::compute_file_fixity(file_path);
                    trace!(file = %name, ok = outcome.is_ok(), "Hashed file");
                    outcome
                })
                .collect()
        });

        let mut digests = BTreeMap::new();
        for ((name, _), outcome) in files.into_iter().zip(outcomes) {
            let fixity = outcome?;
            if digests.insert(name.clone(), fixity).is_some() {
                return Err(InventoryError::NameCollision {
                    path: logical_path.to_string(),
                    name,
                });
            }
        }
        Ok(digests)
    }
}
