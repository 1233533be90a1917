// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace configuration data types.
//!
//! This module defines the shape of the workspace configuration —
//! `workflow.*`, `models.*`, `test.*`, `ppcommit.*` as enumerated in the
//! spec's external-interfaces table — but deliberately does not load or
//! validate a config file from disk. File discovery, schema validation,
//! and layering (project defaults + user overrides) are an external
//! collaborator's responsibility; callers construct a `Config` however
//! they see fit and pass it in as part of `RunnerContext`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roles::AgentRole;

/// Root configuration document, read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,
    #[serde(default)]
    pub test: TestConfig,
    #[serde(default)]
    pub ppcommit: PpCommitConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    #[serde(default)]
    pub agent_roles: HashMap<AgentRole, String>,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub wip: WipConfig,
    #[serde(default)]
    pub scratchpad: ScratchpadConfig,
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}

/// Per-stage subprocess timeout in milliseconds. `0` (or absent, defaulted
/// to `0`) disables the overall timeout for that stage, per the spec's
/// boundary behavior for `timeoutMs=0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutConfig {
    pub issue_selection_ms: u64,
    pub planning_ms: u64,
    pub plan_review_ms: u64,
    pub implementation_ms: u64,
    pub review_round_ms: u64,
    pub programmer_fix_ms: u64,
    pub committer_escalation_ms: u64,
    pub final_gate_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            issue_selection_ms: 5 * 60_000,
            planning_ms: 10 * 60_000,
            plan_review_ms: 5 * 60_000,
            implementation_ms: 30 * 60_000,
            review_round_ms: 10 * 60_000,
            programmer_fix_ms: 15 * 60_000,
            committer_escalation_ms: 10 * 60_000,
            final_gate_ms: 10 * 60_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WipConfig {
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub auto_commit: bool,
    #[serde(default)]
    pub include_untracked: bool,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default)]
    pub fail_on_error: bool,
}

fn default_remote() -> String {
    "origin".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchpadConfig {
    #[serde(default)]
    pub sqlite_sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqlite_path: Option<String>,
}

/// `{on, machine?, run}` — a declarative shell-command escape hatch fired
/// on lifecycle/machine events. Failure is logged but never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfig {
    pub on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    pub run: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub setup: Vec<String>,
    #[serde(default)]
    pub teardown: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckConfig>,
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub allow_no_tests: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckConfig {
    pub url: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_retries() -> u32 {
    3
}

fn default_interval_ms() -> u64 {
    1_000
}

/// Commit-hygiene strictness. Whether a missing `gitleaks` binary is a
/// hard or soft fail is an explicit Open Question the spec leaves
/// unresolved (§9); see DESIGN.md for this workspace's choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpCommitConfig {
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub enable_llm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model_ref: Option<String>,
    #[serde(default)]
    pub treat_warnings_as_errors: bool,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
