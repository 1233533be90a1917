// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `state.json`: state scoped to the currently active issue. Single
//! writer (the currently executing machine), deleted between issues.

use coder_core::PerIssueState;

use crate::atomic::{read_if_exists, remove_if_exists, write_atomic};
use crate::error::StorageError;
use crate::paths::WorkspacePaths;

pub fn load(paths: &WorkspacePaths) -> Result<Option<PerIssueState>, StorageError> {
    let path = paths.per_issue_state();
    match read_if_exists(&path)? {
        Some(bytes) => {
            let state = serde_json::from_slice(&bytes)
                .map_err(|source| StorageError::Malformed { path: path.display().to_string(), source })?;
            Ok(Some(state))
        }
        None => Ok(None),
    }
}

pub fn save(paths: &WorkspacePaths, state: &PerIssueState) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|source| StorageError::Malformed { path: paths.per_issue_state().display().to_string(), source })?;
    write_atomic(&paths.per_issue_state(), &bytes)
}

/// Reset at the start of each new issue: delete the state file itself.
/// Artifact cleanup (`ISSUE.md`, `PLAN.md`, `PLANREVIEW.md`) is the
/// develop loop's responsibility via [`crate::artifacts`], since which
/// artifacts exist is pipeline-specific, not a storage-layer concern.
pub fn delete(paths: &WorkspacePaths) -> Result<(), StorageError> {
    remove_if_exists(&paths.per_issue_state())
}

#[cfg(test)]
#[path = "per_issue_tests.rs"]
mod tests;
