// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `loop-state.json`: the one active develop-loop record per workspace,
//! guard-by-runId writes, and stale-run crash recovery.

use coder_core::{LoopState, RunId, RunStatus};

use crate::atomic::{read_if_exists, write_atomic};
use crate::error::StorageError;
use crate::paths::WorkspacePaths;

/// A run whose heartbeat is older than this and whose `runnerPid` is no
/// longer alive is considered stale.
pub const STALE_HEARTBEAT_MS: u64 = 30_000;

pub fn load(paths: &WorkspacePaths) -> Result<Option<LoopState>, StorageError> {
    let path = paths.loop_state();
    match read_if_exists(&path)? {
        Some(bytes) => {
            let state = serde_json::from_slice(&bytes)
                .map_err(|source| StorageError::Malformed { path: path.display().to_string(), source })?;
            Ok(Some(state))
        }
        None => Ok(None),
    }
}

/// Save the loop state. When `guard_run_id` is `Some`, the write is
/// refused (without touching disk) if the file currently on disk exists
/// and carries a different `runId` — this is what stops a stale
/// background task from clobbering a newer run's state.
pub fn save(
    paths: &WorkspacePaths,
    state: &LoopState,
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
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|source| StorageError::Malformed { path: paths.loop_state().display().to_string(), source })?;
    write_atomic(&paths.loop_state(), &bytes)
}

/// Whether a process with the given pid is still alive. Any error other
/// than "process does not exist" is treated as "alive" — we only want
/// to declare a run stale when we are sure its runner is gone.
#[cfg(unix)]
pub fn is_pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(not(unix))]
pub fn is_pid_alive(_pid: u32) -> bool {
    true
}

/// Whether `state` is stale per the spec's crash-detection rule: its
/// `lastHeartbeatAt` is older than [`STALE_HEARTBEAT_MS`] *and* its
/// `runnerPid` is no longer alive.
pub fn is_stale(state: &LoopState, now_ms: u64, pid_alive: impl Fn(u32) -> bool) -> bool {
    if state.status.is_terminal() {
        return false;
    }
    let heartbeat_stale = match state.last_heartbeat_at {
        Some(at) => now_ms.saturating_sub(at) > STALE_HEARTBEAT_MS,
        None => true,
    };
    if !heartbeat_stale {
        return false;
    }
    match state.runner_pid {
        Some(pid) => !pid_alive(pid),
        None => true,
    }
}

/// Outcome of attempting to start a new run in a workspace that already
/// has a loop-state file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeoverDecision {
    /// No prior run, or the prior run already finished: free to start.
    Clear,
    /// The prior run was stale; it has been marked `cancelled` on disk.
    /// The caller is free to start a new run.
    TookOver { previous_run_id: RunId },
    /// The prior run is neither terminal nor stale: refuse to start.
    Refuse { active_run_id: RunId },
}

/// Implements the "detect staleness, mark prior run terminal, only then
/// create a new run" sequence from the spec's crash/stale-detection
/// rule. Does not itself create the new `LoopState` — callers do that
/// after seeing [`TakeoverDecision::Clear`] or `TookOver`.
pub fn resolve_takeover(
    paths: &WorkspacePaths,
    now_ms: u64,
    pid_alive: impl Fn(u32) -> bool,
) -> Result<TakeoverDecision, StorageError> {
    let Some(mut existing) = load(paths)? else {
        return Ok(TakeoverDecision::Clear);
    };
    if existing.status.is_terminal() {
        return Ok(TakeoverDecision::Clear);
    }
    if !is_stale(&existing, now_ms, pid_alive) {
        return Ok(TakeoverDecision::Refuse { active_run_id: existing.run_id });
    }
    let previous_run_id = existing.run_id;
    existing.status = RunStatus::Cancelled;
    existing.completed_at = Some(now_ms);
    // The takeover write is itself the new authoritative state for that
    // runId, so it is its own guard.
    save(paths, &existing, Some(previous_run_id))?;
    Ok(TakeoverDecision::TookOver { previous_run_id })
}

#[cfg(test)]
#[path = "loop_store_tests.rs"]
mod tests;
