// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The file-based control signal: a fallback path for cancel/pause/resume
//! when the in-memory `CancelToken` of the process holding a run is not
//! reachable (e.g. a CLI invocation signaling a daemon-held run).

use serde::{Deserialize, Serialize};

use crate::RunId;

/// Action carried by a `control.json` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Cancel,
    Pause,
    Resume,
}

crate::simple_display! {
    ControlAction {
        Cancel => "cancel",
        Pause => "pause",
        Resume => "resume",
    }
}

/// Written to a well-known path and consumed-then-unlinked by the runner
/// on each poll. Applies only when `run_id` matches the active run, or
/// is absent (treated as a wildcard match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSignal {
    pub action: ControlAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub ts: u64,
}

impl ControlSignal {
    pub fn new(action: ControlAction, run_id: RunId, ts: u64) -> Self {
        Self {
            action,
            run_id: Some(run_id),
            ts,
        }
    }

    /// Whether this signal should be honored by the run identified by
    /// `active`: an absent `run_id` is a wildcard, matching any run.
    pub fn applies_to(&self, active: RunId) -> bool {
        match &self.run_id {
            Some(id) => *id == active,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
