// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State scoped to the currently active issue. Deleted at the start of
//! each new issue so a stale step flag can never leak across issues.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fingerprint::WorktreeFingerprint;
use crate::SessionId;

/// Boolean/counter flags recording which machines in the develop
/// pipeline have completed for the active issue. Read by a machine
/// before it runs to short-circuit with a cached result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFlags {
    #[serde(default)]
    pub wrote_issue: bool,
    #[serde(default)]
    pub wrote_plan: bool,
    #[serde(default)]
    pub implemented: bool,
    #[serde(default)]
    pub reviewer_completed: bool,
    #[serde(default)]
    pub review_round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_verdict: Option<String>,
    #[serde(default)]
    pub programmer_fixed_round: u32,
    #[serde(default)]
    pub ppcommit_clean: bool,
    #[serde(default)]
    pub tests_passed: bool,
    #[serde(default)]
    pub pr_created: bool,
    /// Flags not named above; forward-compatible with machines added
    /// after this struct was last extended.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// State for the one issue currently being worked, written to
/// `state.json` and deleted between issues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerIssueState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(default)]
    pub steps: StepFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_fingerprint: Option<WorktreeFingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

impl PerIssueState {
    pub fn for_issue(selected: impl Into<String>) -> Self {
        Self {
            selected: Some(selected.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[path = "per_issue_state_tests.rs"]
mod tests;
