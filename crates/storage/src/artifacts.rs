// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic read/write/delete for the named markdown artifacts under
//! `.coder/artifacts/` (`ISSUE.md`, `PLAN.md`, `REVIEW_FINDINGS.md`, …).
//! Which artifacts exist at a given pipeline stage is the engine's
//! concern; storage only knows how to durably persist one by name.

use crate::atomic::{read_if_exists, remove_if_exists, write_atomic};
use crate::error::StorageError;
use crate::paths::WorkspacePaths;

pub fn write(paths: &WorkspacePaths, name: &str, contents: &str) -> Result<(), StorageError> {
    write_atomic(&paths.artifact(name), contents.as_bytes())
}

pub fn read(paths: &WorkspacePaths, name: &str) -> Result<Option<String>, StorageError> {
    let path = paths.artifact(name);
    match read_if_exists(&path)? {
        Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        None => Ok(None),
    }
}

pub fn delete(paths: &WorkspacePaths, name: &str) -> Result<(), StorageError> {
    remove_if_exists(&paths.artifact(name))
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
