//! Integration tests for layered configuration loading

use fixity::config::{global_config_path, ConfigLoader};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

#[test]
fn test_global_config_path_respects_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        assert_eq!(
            global_config_path().unwrap(),
            test_dir.path().join("fixity").join("config.toml")
        );
    });
}

#[test]
fn test_local_config_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let global_dir = test_dir.path().join("fixity");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        r#"
fixity_threads = 3
report_index_db = "/var/lib/fixity/global.db"
"#,
    )
    .unwrap();

    let local = TempDir::new().unwrap();
    fs::create_dir(local.path().join("config")).unwrap();
    fs::write(
        local.path().join("config").join("config.toml"),
        r#"
fixity_threads = 12

[[file_systems]]
fs_base_path = "/srv/archive"
inventory_base_path = "/var/lib/fixity/inventory"
report_base_path = "/var/lib/fixity/reports"
"#,
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(local.path()).unwrap());
    assert_eq!(config.fixity_threads, 12);
    assert_eq!(
        config.report_index_db,
        Some(PathBuf::from("/var/lib/fixity/global.db"))
    );
    assert_eq!(config.file_systems.len(), 1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let test_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&test_dir.path().join("absent.toml")).is_err());
}
