//! CLI parse: clap types for fixity. No behavior; definitions only.

use crate::notify::NotifyMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fixity CLI - inventories and drift detection for preserved file systems
#[derive(Parser, Debug)]
#[command(name = "fixity", version)]
#[command(about = "Record file fixity inventories and detect drift against them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the inventory of a configured file system from scratch
    Populate {
        /// Base path of a configured file system
        fs_base_path: PathBuf,
        /// Rebuild even if an inventory already exists
        #[arg(long)]
        exists_ok: bool,
    },
    /// Compare a directory tree against the inventory
    DetectChanges {
        /// Directory to check (its parent is checked too)
        path: PathBuf,
        /// Print the report as JSON instead of storing it
        #[arg(long)]
        no_report: bool,
        /// Write a tabular export next to the report
        #[arg(long, conflicts_with = "no_report")]
        export: bool,
        /// Send a notification for the report
        #[arg(long, value_enum, conflicts_with = "no_report")]
        notify: Option<NotifyMode>,
    },
    /// Apply a stored report to the inventory
    Update {
        /// Path to a report written by detect-changes
        report_path: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Attach a note to a stored report
    Note {
        report_path: PathBuf,
        text: String,
        /// Note author (default: current user)
        #[arg(long)]
        user: Option<String>,
    },
    /// List indexed reports, newest first
    ListReports {
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Only reports that found changes
        #[arg(long)]
        has_diffs_only: bool,
    },
    /// Write the tabular export of a stored report
    Export {
        /// Path to a `.json` report
        report_path: PathBuf,
    },
}
