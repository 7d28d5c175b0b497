//! Integration tests for the snapshot store

use fixity::store::{locate, SHARD_DEPTH};
use fixity::tree::SnapshotBuilder;
use fixity::{FileSnapshotStore, InventoryError, SnapshotStore};
use std::fs;

use crate::integration::Workspace;

#[test]
fn test_populate_writes_one_record_per_directory() {
    let ws = Workspace::new();
    ws.write("a/one.txt", "1");
    ws.write("a/b/two.txt", "2");
    ws.write("c/three.txt", "3");
    ws.manager(2).populate(false).unwrap();

    let store = FileSnapshotStore::new(&ws.inventory);
    for logical_path in [".", "a", "a/b", "c"] {
        assert!(store.contains(logical_path), "missing record for {}", logical_path);
    }
    let a = store.read("a").unwrap();
    assert!(a.directory_names().contains("b"));
    assert!(a.file_digests().contains_key("one.txt"));
}

#[test]
fn test_record_layout_on_disk() {
    let ws = Workspace::new();
    ws.write("a/one.txt", "1");
    ws.manager(1).populate(false).unwrap();

    let key = locate("a");
    assert_eq!(key.components().count(), SHARD_DEPTH + 1);
    let record = ws.inventory.join(&key);
    let json: serde_json::Value = serde_json::from_slice(&fs::read(record).unwrap()).unwrap();
    assert_eq!(json["path"], "a");
    assert!(json["dirs"].as_array().unwrap().is_empty());
    assert_eq!(json["files"].as_object().unwrap().len(), 1);
    assert!(json["timestamp"].is_string());
}

#[test]
fn test_round_trip_of_built_snapshot() {
    let ws = Workspace::new();
    ws.write("z.txt", "z");
    ws.write("a.txt", "a");
    ws.mkdir("m");

    let snapshot = SnapshotBuilder::new(2).build(&ws.data, &ws.data).unwrap();
    let store = FileSnapshotStore::new(&ws.inventory);
    store.write(&snapshot).unwrap();
    assert_eq!(store.read(".").unwrap(), snapshot);
}

#[test]
fn test_missing_baseline_is_empty() {
    let ws = Workspace::new();
    let store = FileSnapshotStore::new(&ws.inventory);
    assert!(matches!(
        store.read("never/seen").unwrap_err(),
        InventoryError::NotFound { .. }
    ));
    let empty = store.read_or_empty("never/seen").unwrap();
    assert!(empty.directory_names().is_empty());
    assert!(empty.file_digests().is_empty());
}
