//! Command names used in logs and spans.

use crate::cli::parse::Commands;

/// Stable command name for a parsed command (e.g. "detect_changes").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Populate { .. } => "populate",
        Commands::DetectChanges { .. } => "detect_changes",
        Commands::Update { .. } => "update",
        Commands::Note { .. } => "note",
        Commands::ListReports { .. } => "list_reports",
        Commands::Export { .. } => "export",
    }
}
