//! Fixity: Inventories and Drift Detection for Preserved File Systems
//!
//! Records the SHA-256 fixity of every file under a root, one inventory record
//! per directory, and detects drift by comparing fresh scans against those
//! records. Accepted reports are folded back into the inventory.

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod logging;
pub mod manager;
pub mod notify;
pub mod reconcile;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod types;

pub use diff::Diff;
pub use error::{ApiError, InventoryError};
pub use manager::InventoryManager;
pub use report::Report;
pub use snapshot::Snapshot;
pub use store::{FileSnapshotStore, SnapshotStore};
