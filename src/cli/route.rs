//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation;
use crate::config::{ConfigLoader, FileSystemConfig, FixityConfig};
use crate::error::{ApiError, InventoryError};
use crate::export;
use crate::manager::InventoryManager;
use crate::notify::{Notification, Notifier, NotifyMode, WebhookNotifier};
use crate::report::{Report, ReportIndex, ReportStorage};
use crate::tree::path;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runtime context for CLI execution: loaded configuration and the notifier.
pub struct RunContext {
    config: FixityConfig,
    notifier: Option<Box<dyn Notifier>>,
}

impl RunContext {
    /// Create run context from a base directory (for local `config/` files) and
    /// an optional explicit config path. Uses ConfigLoader only.
    pub fn new(base_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&base_dir)?
        };
        Self::from_config(config)
    }

    pub fn from_config(config: FixityConfig) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        let notifier = WebhookNotifier::from_config(&config.notification)?
            .map(|n| Box::new(n) as Box<dyn Notifier>);
        Ok(Self { config, notifier })
    }

    /// Replace the notifier used by `detect-changes --notify`
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &FixityConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = crate::cli::command_name(command), "Executing command");
        match command {
            Commands::Populate {
                fs_base_path,
                exists_ok,
            } => self.handle_populate(fs_base_path, *exists_ok),
            Commands::DetectChanges {
                path,
                no_report,
                export,
                notify,
            } => self.handle_detect_changes(path, *no_report, *export, *notify),
            Commands::Update { report_path, yes } => self.handle_update(report_path, *yes),
            Commands::Note {
                report_path,
                text,
                user,
            } => self.handle_note(report_path, text, user.clone()),
            Commands::ListReports {
                limit,
                has_diffs_only,
            } => self.handle_list_reports(*limit, *has_diffs_only),
            Commands::Export { report_path } => self.handle_export(report_path),
        }
    }

    fn open_index(&self) -> Result<ReportIndex, ApiError> {
        ReportIndex::open(self.config.report_index_path()?)
    }

    fn manager(&self, file_system: &FileSystemConfig) -> InventoryManager {
        InventoryManager::from_config(file_system, &self.config)
    }

    /// Store a report under its file system's report base path and index it.
    fn store_report(
        &self,
        report: &Report,
        file_system: &FileSystemConfig,
    ) -> Result<PathBuf, ApiError> {
        let written = ReportStorage::write(report, &file_system.report_base_path)?;
        let report_path = path::canonicalize_path(&written)?;
        let index = self.open_index()?;
        index.add_report(report, &report_path)?;
        index.flush()?;
        Ok(report_path)
    }

    fn handle_populate(&self, fs_base_path: &Path, exists_ok: bool) -> Result<String, ApiError> {
        let resolved = path::resolve_path(fs_base_path)?;
        let file_system = self.config.file_system_for(&resolved)?;
        if path::resolve_path(&file_system.fs_base_path)? != resolved {
            return Err(ApiError::UnknownBasePath(fs_base_path.to_path_buf()));
        }

        let report = self.manager(file_system).populate(exists_ok)?;
        let report_path = self.store_report(&report, file_system)?;
        Ok(presentation::format_populate_summary(&report, &report_path))
    }

    fn handle_detect_changes(
        &self,
        target: &Path,
        no_report: bool,
        with_export: bool,
        notify: Option<NotifyMode>,
    ) -> Result<String, ApiError> {
        let resolved = path::resolve_path(target)?;
        let file_system = self.config.file_system_for(&resolved)?;
        let report = self.manager(file_system).detect_change(&resolved)?;

        if no_report {
            return serde_json::to_string_pretty(&report).map_err(|e| {
                ApiError::Inventory(InventoryError::MalformedRecord {
                    key: resolved.clone(),
                    reason: e.to_string(),
                })
            });
        }

        let report_path = self.store_report(&report, file_system)?;
        let export_path = if with_export {
            Some(export::write_export(&report, &report_path)?)
        } else {
            None
        };

        let display_path = resolved.display().to_string();
        if let Some(mode) = notify {
            if mode.should_notify(&report) {
                self.send_notification(&report, &display_path, &report_path)?;
            } else {
                info!("No changes detected; notification skipped");
            }
        }

        Ok(presentation::format_detect_summary(
            &report,
            &display_path,
            &report_path,
            export_path.as_deref(),
        ))
    }

    fn send_notification(
        &self,
        report: &Report,
        display_path: &str,
        report_path: &Path,
    ) -> Result<(), ApiError> {
        let notifier = self.notifier.as_ref().ok_or_else(|| {
            ApiError::NotificationError("No notification endpoint configured".to_string())
        })?;
        let report_name = report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.json".to_string());
        let report_json = serde_json::to_string_pretty(report)
            .map_err(|e| ApiError::NotificationError(e.to_string()))?;

        let notification = Notification::for_report(
            report,
            display_path,
            self.config.notification.send_to.clone(),
        )
        .attach(report_name, report_json)
        .attach("report.tables.txt", export::render_text(report));
        notifier.send(&notification)
    }

    fn handle_update(&self, report_path: &Path, yes: bool) -> Result<String, ApiError> {
        // Index keys carry the canonical report path written at detection time.
        let report_path = &path::resolve_path(report_path)?;
        let mut report = ReportStorage::read(report_path)?;
        if report.is_applied() {
            return Err(InventoryError::AlreadyApplied {
                base_path: report.base_path.clone(),
            }
            .into());
        }

        if !report.notes.is_empty() && !yes {
            println!("{}", presentation::format_notes(&report));
            let proceed = dialoguer::Confirm::new()
                .with_prompt("Apply this report to the inventory?")
                .default(true)
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to read confirmation: {}", e)))?;
            if !proceed {
                return Ok("Update cancelled.".to_string());
            }
        }

        let base_path = path::resolve_path(Path::new(&report.base_path))
            .unwrap_or_else(|_| PathBuf::from(&report.base_path));
        let file_system = self.config.file_system_for(&base_path)?;
        let records = self.manager(file_system).update_inventory(&mut report)?;

        ReportStorage::write_to(&report, report_path)?;
        let index = self.open_index()?;
        index.update_applied_timestamp(&report, report_path)?;
        index.flush()?;

        Ok(presentation::format_update_summary(
            &report,
            report_path,
            records.len(),
        ))
    }

    fn handle_note(
        &self,
        report_path: &Path,
        text: &str,
        user: Option<String>,
    ) -> Result<String, ApiError> {
        let mut report = ReportStorage::read(report_path)?;
        let user = user.unwrap_or_else(default_user);
        report.add_note(text, user);
        ReportStorage::write_to(&report, report_path)?;
        Ok(format!("Note added to {}", report_path.display()))
    }

    fn handle_list_reports(&self, limit: usize, has_diffs_only: bool) -> Result<String, ApiError> {
        let reports = self.open_index()?.get_reports(limit, has_diffs_only)?;
        Ok(presentation::format_report_list(&reports))
    }

    fn handle_export(&self, report_path: &Path) -> Result<String, ApiError> {
        if report_path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(InventoryError::InvalidPath(format!(
                "{} is not a .json report",
                report_path.display()
            ))
            .into());
        }
        let report = ReportStorage::read(report_path)?;
        let export_path = export::write_export(&report, report_path)?;
        Ok(format!("Export written to {}", export_path.display()))
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| {
            warn!("No USER or USERNAME set; recording note as unknown");
            "unknown".to_string()
        })
}
