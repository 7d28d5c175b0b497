//! Fixity computation using SHA-256
//!
//! File content is streamed through the hasher in fixed-size chunks, so memory
//! use is constant regardless of file size.

use crate::error::InventoryError;
use crate::types::Fixity;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for streaming file content.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the fixity (hex SHA-256) of a file's content.
pub fn compute_file_fixity(file_path: &Path) -> Result<Fixity, InventoryError> {
    let hashing_failure = |source| InventoryError::HashingFailure {
        path: file_path.to_path_buf(),
        source,
    };

    let file = File::open(file_path).map_err(hashing_failure)?;
    compute_reader_fixity(file).map_err(hashing_failure)
}

/// Stream `reader` to its end through SHA-256. Interrupted reads are retried.
pub fn compute_reader_fixity(mut reader: impl Read) -> io::Result<Fixity> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the fixity of in-memory bytes
pub fn compute_content_fixity(content: &[u8]) -> Fixity {
    hex::encode(Sha256::digest(content))
}

/// Digest of a logical path string, used to derive storage keys.
pub fn compute_path_digest(logical_path: &str) -> String {
    compute_content_fixity(logical_path.as_bytes())
}
