// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.pr_creation`: the final pipeline step. Refuses to run if
//! the worktree has drifted since quality-review finished (spec §4.I
//! fingerprint contract, §7 `WorktreeDrift`), then shells out to `gh`
//! (falling back to `glab` if it isn't on `PATH`) and parses the first
//! `http`-prefixed line of its output as the PR URL (spec §6 PR-creation
//! contract).

use async_trait::async_trait;
use coder_core::CoderError;
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{cd_into, run_shell, shell_quote};
use crate::machines::support::{load_state, save_state};
use crate::review::fingerprint;

fn first_url_line(stdout: &str) -> Option<String> {
    stdout.lines().find(|line| line.trim_start().starts_with("http")).map(|line| line.trim().to_string())
}

async fn create_pr(
    repo_path: Option<&str>,
    title: &str,
    body: &str,
    head: &str,
    base: &str,
    timeout_ms: u64,
) -> Result<String, CoderError> {
    let args = format!(
        "--title {} --body {} --head {} --base {}",
        shell_quote(title),
        shell_quote(body),
        shell_quote(head),
        shell_quote(base),
    );

    let mut output = run_shell(&cd_into(repo_path, &format!("gh pr create {args}")), timeout_ms).await?;
    if output.exit_code == Some(127) {
        output = run_shell(&cd_into(repo_path, &format!("glab mr create {args}")), timeout_ms).await?;
    }
    if !output.success() {
        return Err(CoderError::AgentExit {
            code: output.exit_code,
            message: coder_core::redact::redact(&coder_core::redact::tail(&output.stderr, 1200)),
        });
    }
    first_url_line(&output.stdout)
        .ok_or_else(|| CoderError::AgentExit { code: output.exit_code, message: "no PR URL in output".to_string() })
}

pub struct PrCreationMachine;

#[async_trait]
impl Machine for PrCreationMachine {
    fn name(&self) -> &'static str {
        "develop.pr_creation"
    }

    async fn execute(&self, _input: Value, ctx: &MachineContext) -> MachineOutcome {
        let mut state = match load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if state.steps.pr_created {
            return MachineOutcome::ok(json!({ "cached": true, "prUrl": state.pr_url }));
        }
        if !(state.steps.tests_passed && state.steps.ppcommit_clean) {
            return MachineOutcome::error(
                CoderError::PreconditionFailed("quality_review hard gates have not passed".to_string()).to_string(),
            );
        }

        let Some(expected) = state.review_fingerprint.clone() else {
            return MachineOutcome::error(
                CoderError::PreconditionFailed("quality_review has not recorded a worktree fingerprint".to_string()).to_string(),
            );
        };
        let current = match fingerprint::capture(state.repo_path.as_deref()).await {
            Ok(fp) => fp,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };
        if current != expected {
            return MachineOutcome::error(
                CoderError::WorktreeDrift("worktree changed since quality_review; re-run quality_review".to_string())
                    .to_string(),
            );
        }

        let issue_md = coder_storage::artifacts::read(&ctx.workspace, "ISSUE.md").unwrap_or_default().unwrap_or_default();
        let title = state.selected.clone().unwrap_or_else(|| "untitled issue".to_string());
        let head = state.branch.clone().unwrap_or_else(|| "HEAD".to_string());
        let base = state.base_branch.clone().unwrap_or_else(|| "main".to_string());

        let pr_url = match create_pr(state.repo_path.as_deref(), &title, &issue_md, &head, &base, ctx.config.workflow.timeouts.final_gate_ms).await {
            Ok(url) => url,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        state.steps.pr_created = true;
        state.pr_url = Some(pr_url.clone());
        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({ "prUrl": pr_url }))
    }
}

#[cfg(test)]
#[path = "pr_creation_tests.rs"]
mod tests;
