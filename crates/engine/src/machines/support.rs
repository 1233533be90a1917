// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the concrete develop-pipeline machines: per-issue
//! state load/save, agent invocation with the machine's configured
//! timeout, and a small shell-quoting helper for the git/test commands a
//! few machines shell out to.

use coder_adapters::agent::{ExecuteOptions, RetryOptions};
use coder_adapters::subprocess::{self, RunOptions};
use coder_core::{AgentRole, AgentScope, CoderError, PerIssueState};
use coder_storage::per_issue;

use crate::machine::MachineContext;

pub fn load_state(ctx: &MachineContext) -> Result<PerIssueState, CoderError> {
    per_issue::load(&ctx.workspace).map(|s| s.unwrap_or_default()).map_err(store_err)
}

pub fn save_state(ctx: &MachineContext, state: &PerIssueState) -> Result<(), CoderError> {
    per_issue::save(&ctx.workspace, state).map_err(store_err)
}

fn store_err(e: coder_storage::StorageError) -> CoderError {
    CoderError::StateWrite { phase: "machine".to_string(), message: e.to_string() }
}

/// Single-quote a path for interpolation into a `/bin/sh -lc` command
/// string, the only way this stack's subprocess supervisor accepts a
/// working directory (see [`crate::machines::support::cd_into`]).
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Prefix `command` with a `cd` into `repo_path`, or run it unprefixed
/// against the process's own cwd when no repo path is recorded yet.
pub fn cd_into(repo_path: Option<&str>, command: &str) -> String {
    match repo_path {
        Some(path) => format!("cd {} && {}", shell_quote(path), command),
        None => command.to_string(),
    }
}

/// Resolve and invoke the agent bound to `role`/`scope`, retrying with
/// the machine's configured timeout. Used by every machine that talks
/// to an external coding assistant rather than shelling out directly.
pub async fn invoke_agent(
    ctx: &MachineContext,
    role: AgentRole,
    scope: AgentScope,
    prompt: &str,
    options: ExecuteOptions,
    timeout_ms: u64,
) -> Result<coder_adapters::agent::AgentResponse, CoderError> {
    let (_name, agent) = ctx.agent_pool.get_agent(role, scope);
    let retry = RetryOptions {
        execute: ExecuteOptions { timeout_ms: Some(timeout_ms), ..options },
        ..RetryOptions::default()
    };
    agent.execute_with_retry(prompt, &retry).await
}

/// Run a shell command against the workspace/repo, with a hard timeout
/// and `gitleaks`/test-output patterns honored by the caller. Used by
/// machines that shell out to `git`, the project's test command, or
/// `gh`/`glab` rather than invoking an agent.
pub async fn run_shell(command: &str, timeout_ms: u64) -> Result<subprocess::RunOutput, CoderError> {
    let options = RunOptions { timeout_ms: Some(timeout_ms), ..RunOptions::new() };
    subprocess::run(command, &options).await.map_err(|e| match e {
        subprocess::SubprocessError::Timeout { reason, .. } => CoderError::Timeout(reason),
        subprocess::SubprocessError::Auth { pattern, .. } => CoderError::AuthFailure(pattern),
        other => CoderError::AgentExit { code: None, message: other.to_string() },
    })
}
