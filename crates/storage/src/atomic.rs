// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic per-file writes: write to `<path>.tmp`, then rename over the
//! final path. Best-effort atomic per file; no transactional guarantee
//! across multiple files (spec §1 Non-goals).

use std::fs;
use std::path::Path;

use crate::error::StorageError;

/// Write `contents` to `path` atomically, creating the parent directory
/// first. Each failing phase is annotated so callers and logs can tell
/// `mkdir` apart from `write` apart from `rename`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Mkdir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, contents).map_err(|source| StorageError::Write {
        path: tmp_path.display().to_string(),
        source,
    })?;

    fs::rename(&tmp_path, path).map_err(|source| StorageError::Rename {
        path: path.display().to_string(),
        source,
    })
}

/// Read a file's contents, returning `Ok(None)` (not an error) when it
/// does not exist — the common "no state yet" case for a fresh
/// workspace.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Read { path: path.display().to_string(), source }),
    }
}

/// Remove a file if present; a missing file is not an error (deleting
/// per-issue state between issues is itself idempotent).
pub fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Write { path: path.display().to_string(), source }),
    }
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or("state").to_string();
    name.push_str(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
