// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `control.json`: the file-based fallback for cancel/pause/resume when
//! the in-memory `CancelToken` of the process holding a run is
//! unreachable. Consumed-then-unlinked by the runner on each poll.

use coder_core::{ControlSignal, RunId};

use crate::atomic::{read_if_exists, remove_if_exists, write_atomic};
use crate::error::StorageError;
use crate::paths::WorkspacePaths;

pub fn write(paths: &WorkspacePaths, signal: &ControlSignal) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(signal)
        .map_err(|source| StorageError::Malformed { path: paths.control_signal().display().to_string(), source })?;
    write_atomic(&paths.control_signal(), &bytes)
}

/// Read and unlink the control signal if one is present and applies to
/// `active`. A malformed file is treated as absent and removed so a
/// corrupt write can never wedge the poll loop.
pub fn consume(paths: &WorkspacePaths, active: RunId) -> Result<Option<ControlSignal>, StorageError> {
    let path = paths.control_signal();
    let Some(bytes) = read_if_exists(&path)? else {
        return Ok(None);
    };
    let parsed: Option<ControlSignal> = serde_json::from_slice(&bytes).ok();
    remove_if_exists(&path)?;
    Ok(parsed.filter(|s| s.applies_to(active)))
}

#[cfg(test)]
#[path = "control_store_tests.rs"]
mod tests;
