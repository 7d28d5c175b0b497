//! Shared test utilities for integration tests
//!
//! Provides a scratch file system with its inventory and report directories,
//! and serialized XDG environment setup.

use fixity::config::{FileSystemConfig, FixityConfig};
use fixity::InventoryManager;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with XDG_CONFIG_HOME and HOME pointing into `test_dir`
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();

    env_state.restore();
    result
}

/// Scratch file system: `data/` under inventory, with `inventory/` and `reports/` beside it
pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub data: PathBuf,
    pub inventory: PathBuf,
    pub reports: PathBuf,
    pub index_db: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let data = root.join("data");
        fs::create_dir(&data).unwrap();
        Self {
            data,
            inventory: root.join("inventory"),
            reports: root.join("reports"),
            index_db: root.join("index").join("reports.db"),
            root,
            _temp: temp,
        }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.data.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.data.join(relative)).unwrap();
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.data.join(relative)
    }

    pub fn config(&self) -> FixityConfig {
        FixityConfig {
            file_systems: vec![FileSystemConfig {
                fs_base_path: self.data.clone(),
                inventory_base_path: self.inventory.clone(),
                report_base_path: self.reports.clone(),
            }],
            report_index_db: Some(self.index_db.clone()),
            fixity_threads: 4,
            ..Default::default()
        }
    }

    pub fn manager(&self, concurrency: usize) -> InventoryManager {
        InventoryManager::new(
            &self.data,
            &self.inventory,
            concurrency,
            Default::default(),
        )
    }

    /// All report JSON files written so far, sorted
    pub fn report_files(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        collect_json(&self.reports, &mut out);
        out.sort();
        out
    }
}

fn collect_json(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_json(&path, out);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            out.push(path);
        }
    }
}
