// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue identity and outcome tracking: the unit of work the develop
//! loop schedules, executes, and reports on.

use serde::{Deserialize, Serialize};

/// Where an issue was sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Github,
    Gitlab,
    Linear,
    Local,
}

crate::simple_display! {
    IssueSource {
        Github => "github",
        Gitlab => "gitlab",
        Linear => "linear",
        Local => "local",
    }
}

/// An issue tracked by the develop loop. Uniquely identified by
/// `(source, id)`; immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub source: IssueSource,
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    /// 1..=5, validated by the issue-list machine; kept optional here
    /// since untyped tracker payloads may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Issue {
    /// `(source, id)` composite key used for uniqueness and dependency
    /// edge resolution.
    pub fn key(&self) -> (IssueSource, &str) {
        (self.source, &self.id)
    }
}

crate::builder! {
    pub struct IssueBuilder => Issue {
        set { source: IssueSource = IssueSource::Local }
        into { id: String = "issue-1" }
        into { title: String = "Untitled issue" }
        option { repo_path: String = None }
        option { difficulty: u8 = None }
        set { depends_on: Vec<String> = Vec::new() }
    }
}

/// Status of an issue as it moves through the develop loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
    Deferred,
}

crate::simple_display! {
    IssueStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
        Skipped => "skipped",
        Deferred => "deferred",
    }
}

impl IssueStatus {
    /// Transitions are monotonic except that a deferred issue may return
    /// to in_progress on a later retry pass once its blocking
    /// dependencies clear.
    pub fn can_transition_to(self, next: IssueStatus) -> bool {
        use IssueStatus::*;
        if self == next {
            return true;
        }
        match (self, next) {
            (Pending, _) => true,
            (Deferred, InProgress) | (Deferred, Failed) | (Deferred, Skipped) => true,
            (InProgress, Completed | Failed | Skipped | Deferred) => true,
            _ => false,
        }
    }
}

/// Outcome attached to each issue after processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOutcome {
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IssueOutcome {
    pub fn pending() -> Self {
        Self {
            status: Some(IssueStatus::Pending),
            ..Default::default()
        }
    }

    pub fn status(&self) -> IssueStatus {
        self.status.unwrap_or(IssueStatus::Pending)
    }

    /// Apply a status transition, validating monotonicity. Returns `Err`
    /// with the rejected transition described, without mutating `self`.
    pub fn transition(&mut self, next: IssueStatus) -> Result<(), String> {
        let current = self.status();
        if !current.can_transition_to(next) {
            return Err(format!("illegal transition {current} -> {next}"));
        }
        self.status = Some(next);
        Ok(())
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
