//! Configuration System
//!
//! Hierarchical configuration for file systems under inventory, hashing
//! parallelism, notification and logging, with environment variable overrides
//! and validation.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::WalkerConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixityConfig {
    /// File systems under inventory
    #[serde(default)]
    pub file_systems: Vec<FileSystemConfig>,

    /// Report index database (defaults to the user data directory)
    #[serde(default)]
    pub report_index_db: Option<PathBuf>,

    /// Files hashed concurrently per directory
    #[serde(default = "default_fixity_threads")]
    pub fixity_threads: usize,

    #[serde(default)]
    pub walker: WalkerConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_fixity_threads() -> usize {
    1
}

impl Default for FixityConfig {
    fn default() -> Self {
        Self {
            file_systems: Vec::new(),
            report_index_db: None,
            fixity_threads: default_fixity_threads(),
            walker: WalkerConfig::default(),
            notification: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One file system: the tree to inventory and where its records and reports live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemConfig {
    pub fs_base_path: PathBuf,
    pub inventory_base_path: PathBuf,
    pub report_base_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving notifications
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub send_to: Vec<String>,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    FileSystem(PathBuf, String),
    Notification(String),
    System(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::FileSystem(path, msg) => {
                write!(f, "File system '{}': {}", path.display(), msg)
            }
            ValidationError::Notification(msg) => write!(f, "Notification: {}", msg),
            ValidationError::System(msg) => write!(f, "System: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FileSystemConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fs_base_path.as_os_str().is_empty() {
            return Err("fs_base_path cannot be empty".to_string());
        }
        if self.inventory_base_path.as_os_str().is_empty() {
            return Err("inventory_base_path cannot be empty".to_string());
        }
        if self.report_base_path.as_os_str().is_empty() {
            return Err("report_base_path cannot be empty".to_string());
        }
        if self.inventory_base_path.starts_with(&self.fs_base_path) {
            return Err("inventory_base_path must be outside fs_base_path".to_string());
        }
        if self.report_base_path.starts_with(&self.fs_base_path) {
            return Err("report_base_path must be outside fs_base_path".to_string());
        }
        Ok(())
    }

    /// Whether `path` lies under this file system's base path, component-wise
    pub fn contains(&self, path: &Path) -> bool {
        if path.starts_with(&self.fs_base_path) {
            return true;
        }
        dunce::canonicalize(&self.fs_base_path)
            .map(|base| path.starts_with(base))
            .unwrap_or(false)
    }
}

impl NotificationConfig {
    pub fn validate(&self) -> Result<(), String> {
        match &self.endpoint {
            Some(endpoint)
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") =>
            {
                Err(format!("endpoint '{}' must be an http(s) URL", endpoint))
            }
            None if !self.send_to.is_empty() => {
                Err("send_to is set but no endpoint is configured".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl FixityConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.fixity_threads == 0 {
            errors.push(ValidationError::System(
                "fixity_threads must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for fs in &self.file_systems {
            if let Err(e) = fs.validate() {
                errors.push(ValidationError::FileSystem(fs.fs_base_path.clone(), e));
            }
            if !seen.insert(&fs.fs_base_path) {
                errors.push(ValidationError::FileSystem(
                    fs.fs_base_path.clone(),
                    "Duplicate fs_base_path".to_string(),
                ));
            }
        }

        if let Err(e) = self.notification.validate() {
            errors.push(ValidationError::Notification(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one ConfigError
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// The configured file system containing `path`; the deepest base path wins.
    pub fn file_system_for(&self, path: &Path) -> Result<&FileSystemConfig, ApiError> {
        self.file_systems
            .iter()
            .filter(|fs| fs.contains(path))
            .max_by_key(|fs| fs.fs_base_path.components().count())
            .ok_or_else(|| ApiError::UnknownBasePath(path.to_path_buf()))
    }

    /// Report index location, defaulting to `<data dir>/fixity/reports.db`
    pub fn report_index_path(&self) -> Result<PathBuf, ApiError> {
        if let Some(path) = &self.report_index_db {
            return Ok(path.clone());
        }
        ProjectDirs::from("", "", "fixity")
            .map(|dirs| dirs.data_dir().join("reports.db"))
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "Cannot determine a data directory for the report index".to_string(),
                )
            })
    }
}
