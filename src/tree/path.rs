//! Path canonicalization and logical path derivation
//!
//! A logical path identifies a directory relative to its inventory root. It is
//! `/`-separated, Unicode NFC normalized, and `"."` for the root itself.

use crate::error::InventoryError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Logical path of an inventory root.
pub const ROOT_LOGICAL_PATH: &str = ".";

/// Canonicalize a path that must exist (resolves symlinks, `..`, `.`).
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, InventoryError> {
    dunce::canonicalize(path).map_err(|e| {
        InventoryError::InvalidPath(format!("Failed to canonicalize {:?}: {}", path, e))
    })
}

/// Resolve a path to canonical form, tolerating a final component that no longer exists.
///
/// A directory deleted since the last inventory is still addressable by its
/// parent's canonical path plus its own name.
pub fn resolve_path(path: &Path) -> Result<PathBuf, InventoryError> {
    if path.exists() {
        return canonicalize_path(path);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            Ok(canonicalize_path(parent)?.join(name))
        }
        (Some(_), Some(name)) => {
            let cwd = std::env::current_dir().map_err(|e| InventoryError::io(".", e))?;
            Ok(canonicalize_path(&cwd)?.join(name))
        }
        _ => Err(InventoryError::InvalidPath(format!(
            "Cannot resolve {:?}",
            path
        ))),
    }
}

/// Derive the logical path of `path` relative to `root`.
///
/// Both paths should already be resolved. Fails with `OutsideRoot` when `path`
/// is not below `root`, and with `InvalidPath` on non UTF-8 components.
pub fn logical_path(path: &Path, root: &Path) -> Result<String, InventoryError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| InventoryError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    InventoryError::InvalidPath(format!("Non UTF-8 path component in {:?}", path))
                })?;
                segments.push(name.to_string());
            }
            Component::CurDir => {}
            _ => {
                return Err(InventoryError::InvalidPath(format!(
                    "Unexpected component in {:?}",
                    relative
                )))
            }
        }
    }

    if segments.is_empty() {
        Ok(ROOT_LOGICAL_PATH.to_string())
    } else {
        Ok(normalize_path_string(&segments.join("/")))
    }
}

/// Normalize a path string: Unicode NFC, no trailing separators (except root)
pub fn normalize_path_string(path: &str) -> String {
    let mut result: String = path.nfc().collect();
    if result.len() > 1 {
        while result.ends_with('/') || result.ends_with('\\') {
            result.pop();
        }
    }
    result
}

/// Normalize a single file or directory name as recorded in a snapshot.
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}
