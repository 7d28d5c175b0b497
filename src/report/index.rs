//! Durable sled-backed index of written reports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use tracing::debug;

use crate::error::ApiError;
use crate::report::Report;
use crate::types::Timestamp;

const TREE_REPORTS: &str = "reports";
const KEY_PAD: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub report_path: PathBuf,
    pub created_at: Timestamp,
    pub applied_at: Option<Timestamp>,
    pub base_path: String,
    pub has_diffs: bool,
}

impl ReportSummary {
    fn of(report: &Report, report_path: &Path) -> Self {
        Self {
            report_path: report_path.to_path_buf(),
            created_at: report.created_at,
            applied_at: report.applied_at,
            base_path: report.base_path.clone(),
            has_diffs: report.has_diffs(),
        }
    }
}

#[derive(Clone)]
pub struct ReportIndex {
    db: Db,
    reports: Tree,
}

impl ReportIndex {
    pub fn new(db: Db) -> Result<Self, ApiError> {
        let reports = db.open_tree(TREE_REPORTS)?;
        Ok(Self { db, reports })
    }

    /// Open (or create) the index database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::IndexError(format!("{}: {}", parent.display(), e)))?;
        }
        Self::new(sled::open(path)?)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn add_report(&self, report: &Report, report_path: &Path) -> Result<(), ApiError> {
        self.put(&ReportSummary::of(report, report_path))
    }

    /// Record the report's applied timestamp. Unindexed reports are added.
    pub fn update_applied_timestamp(
        &self,
        report: &Report,
        report_path: &Path,
    ) -> Result<(), ApiError> {
        self.put(&ReportSummary::of(report, report_path))
    }

    /// Indexed reports, newest first
    pub fn get_reports(
        &self,
        limit: usize,
        has_diffs_only: bool,
    ) -> Result<Vec<ReportSummary>, ApiError> {
        let mut out = Vec::new();
        for result in self.reports.iter().rev() {
            if out.len() >= limit {
                break;
            }
            let (_, value) = result?;
            let summary: ReportSummary = bincode::deserialize(&value)
                .map_err(|e| ApiError::IndexError(e.to_string()))?;
            if has_diffs_only && !summary.has_diffs {
                continue;
            }
            out.push(summary);
        }
        Ok(out)
    }

    pub fn flush(&self) -> Result<(), ApiError> {
        self.db.flush()?;
        Ok(())
    }

    fn put(&self, summary: &ReportSummary) -> Result<(), ApiError> {
        let key = encode_key(summary.created_at, &summary.report_path);
        let value =
            bincode::serialize(summary).map_err(|e| ApiError::IndexError(e.to_string()))?;
        debug!(report = %summary.report_path.display(), "Indexing report");
        self.reports.insert(key.as_bytes(), value)?;
        Ok(())
    }
}

fn encode_key(created_at: Timestamp, report_path: &Path) -> String {
    let micros = created_at.timestamp_micros().max(0);
    format!(
        "{:0width$}:{}",
        micros,
        report_path.display(),
        width = KEY_PAD
    )
}
