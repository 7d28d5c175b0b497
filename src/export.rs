//! Tabular export of a report: one named table per change category.

use crate::error::{ApiError, InventoryError};
use crate::report::Report;
use crate::types::format_timestamp;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::fs;
use std::path::{Path, PathBuf};

/// Named table in an export
pub struct Sheet {
    pub name: &'static str,
    pub table: Table,
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

/// Render the Summary, Directories, Files, Fixity and Notes sheets.
pub fn render_sheets(report: &Report) -> Vec<Sheet> {
    let mut summary = new_table(vec!["Field", "Value"]);
    summary.add_row(vec!["Base path".to_string(), report.base_path.clone()]);
    summary.add_row(vec!["Created".to_string(), format_timestamp(&report.created_at)]);
    summary.add_row(vec![
        "Applied".to_string(),
        report
            .applied_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string()),
    ]);
    summary.add_row(vec![
        "Directories with changes".to_string(),
        report.diffs.len().to_string(),
    ]);
    summary.add_row(vec![
        "Total changes".to_string(),
        report
            .diffs
            .iter()
            .map(|d| d.change_count())
            .sum::<usize>()
            .to_string(),
    ]);

    let mut directories = new_table(vec!["Path", "Directory", "Change"]);
    let mut files = new_table(vec!["Path", "File", "Fixity", "Change"]);
    let mut fixity = new_table(vec!["Path", "File", "Inventory fixity", "Observed fixity"]);
    for diff in &report.diffs {
        for name in &diff.directories_missing_from_baseline {
            directories.add_row(vec![diff.logical_path.as_str(), name.as_str(), "missing from inventory"]);
        }
        for name in &diff.directories_missing_from_observed {
            directories.add_row(vec![diff.logical_path.as_str(), name.as_str(), "missing from fs"]);
        }
        for (name, digest) in &diff.files_missing_from_baseline {
            files.add_row(vec![
                diff.logical_path.as_str(),
                name.as_str(),
                digest.as_str(),
                "missing from inventory",
            ]);
        }
        for (name, digest) in &diff.files_missing_from_observed {
            files.add_row(vec![
                diff.logical_path.as_str(),
                name.as_str(),
                digest.as_str(),
                "missing from fs",
            ]);
        }
        for (name, (before, after)) in &diff.fixity_mismatch {
            fixity.add_row(vec![
                diff.logical_path.as_str(),
                name.as_str(),
                before.as_str(),
                after.as_str(),
            ]);
        }
    }

    let mut notes = new_table(vec!["Timestamp", "User", "Note"]);
    for note in &report.notes {
        notes.add_row(vec![
            format_timestamp(&note.timestamp),
            note.user.clone(),
            note.text.clone(),
        ]);
    }

    vec![
        Sheet { name: "Summary", table: summary },
        Sheet { name: "Directories", table: directories },
        Sheet { name: "Files", table: files },
        Sheet { name: "Fixity", table: fixity },
        Sheet { name: "Notes", table: notes },
    ]
}

/// All sheets as one text document
pub fn render_text(report: &Report) -> String {
    render_sheets(report)
        .into_iter()
        .map(|sheet| format!("== {} ==\n{}\n", sheet.name, sheet.table))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Export path next to a stored report: `<timestamp>.json` becomes `<timestamp>.tables.txt`
pub fn export_path(report_path: &Path) -> PathBuf {
    report_path.with_extension("tables.txt")
}

/// Write the export for the report stored at `report_path`. Returns the export path.
pub fn write_export(report: &Report, report_path: &Path) -> Result<PathBuf, ApiError> {
    let path = export_path(report_path);
    fs::write(&path, render_text(report)).map_err(|e| InventoryError::io(&path, e))?;
    Ok(path)
}
