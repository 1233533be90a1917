// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one active loop state per workspace: the scheduling order, the
//! current position in it, and the heartbeat the crash detector reads.

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueOutcome};
use crate::RunId;

/// Status of the develop loop as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    RunStatus {
        Idle => "idle",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl RunStatus {
    /// Terminal statuses never transition further; a new start in the
    /// same workspace is free to supersede them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

/// One entry in the scheduled queue: the immutable issue plus its
/// mutable outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub outcome: IssueOutcome,
}

impl QueuedIssue {
    pub fn pending(issue: Issue) -> Self {
        Self {
            issue,
            outcome: IssueOutcome::pending(),
        }
    }
}

/// Durable, per-workspace record of the develop loop's progress.
/// Exactly one live instance per workspace; writes are guarded by
/// `runId` so a stale background task cannot clobber a newer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    pub run_id: RunId,
    pub status: RunStatus,
    pub issue_queue: Vec<QueuedIssue>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage_started_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_agent: Option<String>,
    pub started_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

impl LoopState {
    /// A brand-new run, idle until the develop loop's main pass begins.
    pub fn new(run_id: RunId, started_at: u64, runner_pid: u32) -> Self {
        Self {
            run_id,
            status: RunStatus::Idle,
            issue_queue: Vec::new(),
            current_index: 0,
            current_stage: None,
            current_stage_started_at: None,
            last_heartbeat_at: Some(started_at),
            runner_pid: Some(runner_pid),
            active_agent: None,
            started_at,
            completed_at: None,
        }
    }

    pub fn current_issue(&self) -> Option<&QueuedIssue> {
        self.issue_queue.get(self.current_index)
    }

    /// An empty queue completes immediately (spec boundary behavior):
    /// no machine invocation, no heartbeat.
    pub fn is_empty_queue(&self) -> bool {
        self.issue_queue.is_empty()
    }

    pub fn summary(&self) -> LoopSummary {
        let mut summary = LoopSummary::default();
        for q in &self.issue_queue {
            use crate::issue::IssueStatus::*;
            match q.outcome.status() {
                Completed => summary.completed += 1,
                Failed => summary.failed += 1,
                Skipped => summary.skipped += 1,
                Deferred => summary.deferred += 1,
                Pending | InProgress => summary.pending += 1,
            }
        }
        summary
    }
}

/// Terminal tallies over the issue queue, used for the loop's final
/// `{status, completed, failed, skipped}` result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub completed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub deferred: u32,
    pub pending: u32,
}

#[cfg(test)]
#[path = "loop_state_tests.rs"]
mod tests;
