//! Error types for fixity inventories and the tooling built on them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the inventory core: scanning, storage, diffing and reconciliation.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("No inventory record for {path}")]
    NotFound { path: String },

    #[error("Inventory path mismatch: observed {observed}, baseline {baseline}")]
    PathMismatch { observed: String, baseline: String },

    #[error("Failed to hash {path:?}: {source}")]
    HashingFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory {path:?}: {source}")]
    ListingFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Stale baseline for {path}: {name} has fixity {found:?} in the inventory, report expects {expected}"
    )]
    StaleBaseline {
        path: String,
        name: String,
        expected: String,
        found: Option<String>,
    },

    #[error("Malformed inventory record at {key:?}: {reason}")]
    MalformedRecord { key: PathBuf, reason: String },

    #[error("{name} is recorded as both a file and a directory in {path}")]
    NameCollision { path: String, name: String },

    #[error("{path:?} is not contained in {root:?}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Report for {base_path} has already been applied")]
    AlreadyApplied { base_path: String },

    #[error("Failed to start hashing workers: {0}")]
    WorkerPool(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InventoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InventoryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the command layer (configuration, report index, notification).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Report index error: {0}")]
    IndexError(String),

    #[error("Notification failed: {0}")]
    NotificationError(String),

    #[error("Report not found: {0:?}")]
    ReportNotFound(PathBuf),

    #[error("{0:?} is not contained in any configured file system base path")]
    UnknownBasePath(PathBuf),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<sled::Error> for ApiError {
    fn from(err: sled::Error) -> Self {
        ApiError::IndexError(err.to_string())
    }
}
