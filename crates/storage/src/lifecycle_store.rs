// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `workflow-state.json`: the serialized lifecycle snapshot, overwritten
//! on every transition, plus a best-effort relational mirror keyed by
//! `runId` at `state.db`.
//!
//! The mirror is append-only JSON Lines rather than an embedded SQL
//! engine: the teacher's own durable-state layer favors an appended,
//! replayable log over a transactional database for exactly this shape
//! of "never lose a transition, occasionally replay" requirement, and
//! that idiom carries over here (see DESIGN.md).

use coder_core::{LifecycleSnapshot, RunId};

use crate::atomic::{read_if_exists, write_atomic};
use crate::error::StorageError;
use crate::paths::WorkspacePaths;

pub fn load(paths: &WorkspacePaths) -> Result<Option<LifecycleSnapshot>, StorageError> {
    let path = paths.workflow_state();
    match read_if_exists(&path)? {
        Some(bytes) => {
            let snap = serde_json::from_slice(&bytes)
                .map_err(|source| StorageError::Malformed { path: path.display().to_string(), source })?;
            Ok(Some(snap))
        }
        None => Ok(None),
    }
}

/// Persist a snapshot to `workflow-state.json`, guarded by `runId` when
/// requested, and append it to the `state.db` mirror on a best-effort
/// basis — a mirror write failure is logged, not propagated, since the
/// snapshot file is the single source of truth.
pub fn save(
    paths: &WorkspacePaths,
    snapshot: &LifecycleSnapshot,
    guard_run_id: Option<RunId>,
) -> Result<(), StorageError> {
    if let Some(guard) = guard_run_id {
        if let Some(on_disk) = load(paths)? {
            if on_disk.run_id != guard {
                return Err(StorageError::GuardMismatch {
                    expected: guard.to_string(),
                    found: on_disk.run_id.to_string(),
                });
            }
        }
    }
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|source| StorageError::Malformed { path: paths.workflow_state().display().to_string(), source })?;
    write_atomic(&paths.workflow_state(), &bytes)?;

    if let Err(e) = append_mirror(paths, snapshot) {
        tracing::warn!(error = %e, "state.db mirror append failed; workflow-state.json remains authoritative");
    }
    Ok(())
}

fn append_mirror(paths: &WorkspacePaths, snapshot: &LifecycleSnapshot) -> Result<(), StorageError> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let path = paths.state_db();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| StorageError::Mkdir { path: parent.display().to_string(), source })?;
    }
    let mut line = serde_json::to_vec(snapshot)
        .map_err(|source| StorageError::Malformed { path: path.display().to_string(), source })?;
    line.push(b'\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| StorageError::Write { path: path.display().to_string(), source })?;
    file.write_all(&line).map_err(|source| StorageError::Write { path: path.display().to_string(), source })
}

/// Replay the mirror for a given `runId`, returning its transitions in
/// append order. Used for recovery/debugging when `workflow-state.json`
/// itself is unreadable; not on the normal read path.
pub fn replay_mirror(paths: &WorkspacePaths, run_id: RunId) -> Result<Vec<LifecycleSnapshot>, StorageError> {
    let path = paths.state_db();
    let Some(bytes) = read_if_exists(&path)? else {
        return Ok(Vec::new());
    };
    let text = String::from_utf8_lossy(&bytes);
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let snap: LifecycleSnapshot = match serde_json::from_str(line) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if snap.run_id == run_id {
            out.push(snap);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "lifecycle_store_tests.rs"]
mod tests;
