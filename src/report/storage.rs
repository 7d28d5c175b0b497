//! JSON persistence for reports under a file system's report base path

use crate::error::{ApiError, InventoryError};
use crate::report::Report;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ReportStorage;

impl ReportStorage {
    /// Write `report` under `base` at its storage path. Returns the full path.
    pub fn write(report: &Report, base: &Path) -> Result<PathBuf, ApiError> {
        let report_path = base.join(report.storage_path());
        Self::write_to(report, &report_path)?;
        Ok(report_path)
    }

    /// Overwrite the report stored at `report_path`.
    pub fn write_to(report: &Report, report_path: &Path) -> Result<(), ApiError> {
        debug!(report = %report_path.display(), "Writing report");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent).map_err(|e| InventoryError::io(parent, e))?;
        }
        let serialized =
            serde_json::to_vec_pretty(report).map_err(|e| InventoryError::MalformedRecord {
                key: report_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let temp_path = report_path.with_extension("json.tmp");
        fs::write(&temp_path, &serialized).map_err(|e| InventoryError::io(&temp_path, e))?;
        fs::rename(&temp_path, report_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            InventoryError::io(report_path, e)
        })?;
        Ok(())
    }

    pub fn read(report_path: &Path) -> Result<Report, ApiError> {
        let bytes = match fs::read(report_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ApiError::ReportNotFound(report_path.to_path_buf()))
            }
            Err(e) => return Err(InventoryError::io(report_path, e).into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            InventoryError::MalformedRecord {
                key: report_path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
