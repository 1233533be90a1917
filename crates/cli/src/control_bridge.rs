// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the file-based `control.json` fallback into the in-process
//! [`CancelToken`] a run is actually driven by.
//!
//! The engine's [`coder_engine::runner::WorkflowRunner`] and develop
//! loop check only the in-memory token between steps; neither of them
//! ever calls `coder_storage::control_store::consume`. Per the design
//! note on cancellation (both a live `CancelToken` and a written
//! `control.json` are valid sources, and either one setting cancelled
//! must be honored), this binary is the natural place to reconcile the
//! two: it is the only long-lived process in this architecture (no
//! daemon per spec §1/§5), so it spawns one polling task per run that
//! consumes `control.json` and applies whatever it finds to the same
//! `CancelToken` the runner is watching.

use std::time::Duration;

use coder_core::{CancelToken, ControlAction, RunId};
use coder_storage::WorkspacePaths;

/// How often the bridge checks for a written `control.json`. Matches the
/// runner's own pause-poll cadence so a signal is never more stale than
/// one checkpoint.
const POLL_INTERVAL_MS: u64 = 1_000;

/// Spawns the polling task. The returned handle should be aborted once
/// the run this token belongs to has finished, so a stale task from a
/// prior run never consumes a signal meant for a later one.
pub fn spawn(workspace: WorkspacePaths, run_id: RunId, cancel: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            match coder_storage::control_store::consume(&workspace, run_id) {
                Ok(Some(signal)) => apply(&cancel, signal.action),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "control signal read skipped"),
            }
        }
    })
}

fn apply(cancel: &CancelToken, action: ControlAction) {
    match action {
        ControlAction::Cancel => cancel.cancel(),
        ControlAction::Pause => cancel.pause(),
        ControlAction::Resume => cancel.resume(),
    }
}

#[cfg(test)]
#[path = "control_bridge_tests.rs"]
mod tests;
