// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Finite states of a run, and the serialized snapshot persisted on every
//! transition to `workflow-state.json` (and, best-effort, a relational
//! mirror keyed by `runId`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RunId;

/// `idle -> running <-> paused -> cancelling -> {completed,failed,cancelled}`.
/// Every transition carries a timestamp and is persisted before the next
/// agent invocation begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Running,
    Paused,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    LifecycleState {
        Idle => "idle",
        Running => "running",
        Paused => "paused",
        Cancelling => "cancelling",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl LifecycleState {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            LifecycleState::Completed | LifecycleState::Failed | LifecycleState::Cancelled
        )
    }

    /// Whether `next` is a legal transition from `self`. Self-transitions
    /// (`running --HEARTBEAT/STAGE--> running`) are always legal and are
    /// the common case on every heartbeat tick.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        if self == next {
            return matches!(self, Running | Paused);
        }
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Cancelling)
                | (Paused, Cancelling)
                | (Running, Completed)
                | (Paused, Completed)
                | (Cancelling, Completed)
                | (Running, Failed)
                | (Paused, Failed)
                | (Cancelling, Failed)
                | (Running, Cancelled)
                | (Paused, Cancelled)
                | (Cancelling, Cancelled)
        )
    }
}

/// Free-form context carried alongside the state name: heartbeat time,
/// current stage, and a terminal error message when applicable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional fields a workflow-specific caller wants mirrored without
    /// widening this struct.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The serialized form of the lifecycle machine, written on every
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSnapshot {
    pub run_id: RunId,
    pub workflow: String,
    pub value: LifecycleState,
    #[serde(default)]
    pub context: LifecycleContext,
    pub updated_at: u64,
}

impl LifecycleSnapshot {
    pub fn new(run_id: RunId, workflow: impl Into<String>, updated_at: u64) -> Self {
        Self {
            run_id,
            workflow: workflow.into(),
            value: LifecycleState::Idle,
            context: LifecycleContext {
                started_at: Some(updated_at),
                last_heartbeat_at: Some(updated_at),
                ..Default::default()
            },
            updated_at,
        }
    }

    /// Apply a transition, updating `context` fields that naturally follow
    /// from the new state. Returns `Err` describing the illegal transition
    /// without mutating `self`.
    pub fn transition(&mut self, next: LifecycleState, at: u64) -> Result<(), String> {
        if !self.value.can_transition_to(next) {
            return Err(format!("illegal lifecycle transition {} -> {}", self.value, next));
        }
        self.value = next;
        self.updated_at = at;
        if next.is_final() {
            self.context.completed_at = Some(at);
        }
        Ok(())
    }

    pub fn heartbeat(&mut self, at: u64) {
        self.context.last_heartbeat_at = Some(at);
        self.updated_at = at;
    }

    pub fn set_stage(&mut self, stage: impl Into<String>, at: u64) {
        self.context.current_stage = Some(stage.into());
        self.updated_at = at;
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
