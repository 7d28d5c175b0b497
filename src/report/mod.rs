//! Report Aggregator
//!
//! A report collects every non-empty diff found by one walk under a file
//! system, plus reviewer notes. It is accepted at most once.

pub mod index;
pub mod storage;

pub use index::{ReportIndex, ReportSummary};
pub use storage::ReportStorage;

use crate::diff::Diff;
use crate::error::InventoryError;
use crate::types::{self, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reviewer annotation attached to a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub user: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub base_path: String,
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    #[serde(rename = "applied_timestamp", default)]
    pub applied_at: Option<Timestamp>,
    #[serde(rename = "inventory_diffs")]
    pub diffs: Vec<Diff>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Report {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            created_at: types::now(),
            applied_at: None,
            diffs: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Append a diff if it carries any change. Returns whether it was kept.
    pub fn push(&mut self, diff: Diff) -> bool {
        if diff.has_changes() {
            self.diffs.push(diff);
            true
        } else {
            false
        }
    }

    /// Mark the report as accepted into the inventory.
    pub fn applied(&mut self) -> Result<Timestamp, InventoryError> {
        if self.applied_at.is_some() {
            return Err(InventoryError::AlreadyApplied {
                base_path: self.base_path.clone(),
            });
        }
        let now = types::now();
        self.applied_at = Some(now);
        Ok(now)
    }

    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    pub fn add_note(&mut self, text: impl Into<String>, user: impl Into<String>) -> &Note {
        self.notes.push(Note {
            text: text.into(),
            user: user.into(),
            timestamp: types::now(),
        });
        &self.notes[self.notes.len() - 1]
    }

    pub fn has_diffs(&self) -> bool {
        !self.diffs.is_empty()
    }

    /// Location relative to the report base path: `YYYY/MM/DD/<timestamp>.json`
    pub fn storage_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.created_at.format("%Y").to_string());
        path.push(self.created_at.format("%m").to_string());
        path.push(self.created_at.format("%d").to_string());
        path.push(format!("{}.json", types::format_timestamp(&self.created_at)));
        path
    }
}
