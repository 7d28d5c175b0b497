//! CLI presentation: text formatters for command results.

use crate::report::{Report, ReportSummary};
use crate::types::format_timestamp;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

fn headline(report: &Report, path: &str) -> String {
    if report.has_diffs() {
        format!("Changes detected in {}", path).yellow().to_string()
    } else {
        format!("No changes detected in {}", path).green().to_string()
    }
}

pub fn format_detect_summary(
    report: &Report,
    path: &str,
    report_path: &Path,
    export_path: Option<&Path>,
) -> String {
    let mut out = headline(report, path);
    for diff in &report.diffs {
        out.push_str(&format!(
            "\n  {}: {} change(s)",
            diff.logical_path,
            diff.change_count()
        ));
    }
    out.push_str(&format!("\nReport: {}", report_path.display()));
    if let Some(export_path) = export_path {
        out.push_str(&format!("\nExport: {}", export_path.display()));
    }
    out
}

pub fn format_populate_summary(report: &Report, report_path: &Path) -> String {
    let directories = report.diffs.len();
    let files: usize = report
        .diffs
        .iter()
        .map(|d| d.files_missing_from_baseline.len())
        .sum();
    format!(
        "Inventory populated for {}: {} director{} with content, {} file(s)\nReport: {}",
        report.base_path,
        directories,
        if directories == 1 { "y" } else { "ies" },
        files,
        report_path.display()
    )
}

pub fn format_update_summary(report: &Report, report_path: &Path, records: usize) -> String {
    format!(
        "Applied {} at {}: {} inventory record(s) updated",
        report_path.display(),
        report
            .applied_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string()),
        records
    )
}

pub fn format_notes(report: &Report) -> String {
    let mut out = format!("Notes ({}):", report.notes.len());
    for note in &report.notes {
        out.push_str(&format!(
            "\n  [{}] {}: {}",
            format_timestamp(&note.timestamp),
            note.user.bold(),
            note.text
        ));
    }
    out
}

pub fn format_report_list(reports: &[ReportSummary]) -> String {
    if reports.is_empty() {
        return "No reports indexed.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Created", "Base path", "Changes", "Applied", "Report"]);
    for r in reports {
        table.add_row(vec![
            format_timestamp(&r.created_at),
            r.base_path.clone(),
            if r.has_diffs { "yes" } else { "no" }.to_string(),
            r.applied_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
            r.report_path.display().to_string(),
        ]);
    }
    table.to_string()
}
