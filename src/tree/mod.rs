//! Filesystem scanning
//!
//! Hashes file content, lists directories and composes per-directory
//! snapshots into tree walks.

pub mod builder;
pub mod hasher;
pub mod path;
pub mod walker;

pub use builder::SnapshotBuilder;
pub use walker::{TreeWalker, WalkerConfig};
