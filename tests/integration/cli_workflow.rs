//! Command workflows through RunContext: detect, note, update, list, export

use clap::Parser;
use fixity::cli::{Cli, Commands, RunContext};
use fixity::error::ApiError;
use fixity::notify::{Notification, Notifier, NotifyMode};
use fixity::report::{ReportIndex, ReportStorage};
use fixity::InventoryError;
use std::sync::{Arc, Mutex};

use crate::integration::Workspace;

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) -> Result<(), ApiError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn detect(ws: &Workspace, path: &str) -> Commands {
    Commands::DetectChanges {
        path: ws.path(path),
        no_report: false,
        export: false,
        notify: None,
    }
}

#[test]
fn test_populate_detect_update_cycle() {
    let ws = Workspace::new();
    ws.write("a/one.txt", "1");
    let ctx = RunContext::from_config(ws.config()).unwrap();

    let out = ctx
        .execute(&Commands::Populate {
            fs_base_path: ws.data.clone(),
            exists_ok: false,
        })
        .unwrap();
    assert!(out.contains("Inventory populated"));

    let err = ctx
        .execute(&Commands::Populate {
            fs_base_path: ws.data.clone(),
            exists_ok: false,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Inventory(InventoryError::Io { .. })));

    ws.write("a/one.txt", "changed");
    let out = ctx.execute(&detect(&ws, "a")).unwrap();
    assert!(out.contains("Changes detected"));

    let reports = ws.report_files();
    assert_eq!(reports.len(), 2);
    let latest = reports
        .iter()
        .find(|p| !ReportStorage::read(p).unwrap().is_applied())
        .unwrap()
        .clone();

    let out = ctx
        .execute(&Commands::Update {
            report_path: latest.clone(),
            yes: true,
        })
        .unwrap();
    assert!(out.contains("inventory record(s) updated"));
    assert!(ReportStorage::read(&latest).unwrap().is_applied());

    let err = ctx
        .execute(&Commands::Update {
            report_path: latest,
            yes: true,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Inventory(InventoryError::AlreadyApplied { .. })
    ));

    let out = ctx.execute(&detect(&ws, "a")).unwrap();
    assert!(out.contains("No changes detected"));
}

#[test]
fn test_subtree_report_records_start_and_applies() {
    let ws = Workspace::new();
    ws.write("sub/one.txt", "1");
    ws.write("other/two.txt", "2");
    let ctx = RunContext::from_config(ws.config()).unwrap();

    ctx.execute(&detect(&ws, "sub")).unwrap();
    let report_path = ws.report_files().remove(0);
    let report = ReportStorage::read(&report_path).unwrap();
    assert_eq!(report.base_path, ws.path("sub").display().to_string());

    ctx.execute(&Commands::Update {
        report_path: report_path.clone(),
        yes: true,
    })
    .unwrap();
    assert!(ReportStorage::read(&report_path).unwrap().is_applied());

    let out = ctx.execute(&detect(&ws, "sub")).unwrap();
    assert!(out.contains("No changes detected"));
}

#[test]
fn test_update_through_alternate_report_path_updates_same_entry() {
    let ws = Workspace::new();
    ws.write("f.txt", "f");
    let ctx = RunContext::from_config(ws.config()).unwrap();
    ctx.execute(&detect(&ws, ".")).unwrap();

    let report_path = ws.report_files().remove(0);
    let relative = report_path.strip_prefix(&ws.reports).unwrap();
    let spelled = ws.reports.join("..").join("reports").join(".").join(relative);
    ctx.execute(&Commands::Update {
        report_path: spelled,
        yes: true,
    })
    .unwrap();
    drop(ctx);

    let index = ReportIndex::open(&ws.index_db).unwrap();
    let reports = index.get_reports(10, false).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_path, report_path);
    assert!(reports[0].applied_at.is_some());
}

#[test]
fn test_no_report_prints_json_and_writes_nothing() {
    let ws = Workspace::new();
    ws.write("f.txt", "f");
    let ctx = RunContext::from_config(ws.config()).unwrap();

    let out = ctx
        .execute(&Commands::DetectChanges {
            path: ws.data.clone(),
            no_report: true,
            export: false,
            notify: None,
        })
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["inventory_diffs"][0]["path"], ".");
    assert!(json["applied_timestamp"].is_null());
    assert!(ws.report_files().is_empty());
}

#[test]
fn test_note_and_list_reports() {
    let ws = Workspace::new();
    ws.write("f.txt", "f");
    let ctx = RunContext::from_config(ws.config()).unwrap();
    ctx.execute(&detect(&ws, ".")).unwrap();

    let listed = ctx
        .execute(&Commands::ListReports {
            limit: 10,
            has_diffs_only: true,
        })
        .unwrap();
    assert!(listed.contains(&ws.data.display().to_string()));

    let report_path = ws.report_files().remove(0);
    ctx.execute(&Commands::Note {
        report_path: report_path.clone(),
        text: "expected ingest".to_string(),
        user: Some("archivist".to_string()),
    })
    .unwrap();
    let report = ReportStorage::read(&report_path).unwrap();
    assert_eq!(report.notes.len(), 1);
    assert_eq!(report.notes[0].user, "archivist");
}

#[test]
fn test_list_reports_empty_index() {
    let ws = Workspace::new();
    let ctx = RunContext::from_config(ws.config()).unwrap();
    let out = ctx
        .execute(&Commands::ListReports {
            limit: 10,
            has_diffs_only: false,
        })
        .unwrap();
    assert_eq!(out, "No reports indexed.");
}

#[test]
fn test_export_and_notify() {
    let ws = Workspace::new();
    ws.write("f.txt", "f");
    let notifier = RecordingNotifier::default();
    let ctx = RunContext::from_config(ws.config())
        .unwrap()
        .with_notifier(Box::new(notifier.clone()));

    let out = ctx
        .execute(&Commands::DetectChanges {
            path: ws.data.clone(),
            no_report: false,
            export: true,
            notify: Some(NotifyMode::ErrorOnly),
        })
        .unwrap();
    assert!(out.contains("Export:"));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("Changes detected in"));
    assert_eq!(sent[0].attachments.len(), 2);
    drop(sent);

    let report_path = ws.report_files().remove(0);
    let export_path = report_path.with_extension("tables.txt");
    assert!(export_path.is_file());

    let err = ctx
        .execute(&Commands::Export {
            report_path: export_path,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Inventory(InventoryError::InvalidPath(_))));
    ctx.execute(&Commands::Export { report_path }).unwrap();
}

#[test]
fn test_error_only_skips_clean_report() {
    let ws = Workspace::new();
    let notifier = RecordingNotifier::default();
    let ctx = RunContext::from_config(ws.config())
        .unwrap()
        .with_notifier(Box::new(notifier.clone()));

    ctx.execute(&Commands::DetectChanges {
        path: ws.data.clone(),
        no_report: false,
        export: false,
        notify: Some(NotifyMode::ErrorOnly),
    })
    .unwrap();
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[test]
fn test_path_outside_configured_file_systems() {
    let ws = Workspace::new();
    let ctx = RunContext::from_config(ws.config()).unwrap();
    let err = ctx
        .execute(&Commands::DetectChanges {
            path: ws.reports.clone(),
            no_report: true,
            export: false,
            notify: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::UnknownBasePath(_)));
}

#[test]
fn test_parse_detect_changes_flags() {
    let cli = Cli::try_parse_from([
        "fixity",
        "detect-changes",
        "/srv/data/a",
        "--export",
        "--notify",
        "error-only",
    ])
    .unwrap();
    match cli.command {
        Commands::DetectChanges {
            export, notify, no_report, ..
        } => {
            assert!(export);
            assert!(!no_report);
            assert_eq!(notify, Some(NotifyMode::ErrorOnly));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    assert!(
        Cli::try_parse_from(["fixity", "detect-changes", "/x", "--no-report", "--export"])
            .is_err()
    );
}
