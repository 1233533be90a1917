// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.planning`: the planner agent drafts `PLAN.md`. The planner
//! is restricted to that one artifact — any change it makes to the
//! checked-out repo itself is a [`CoderError::ConstraintViolation`]
//! (spec §7), reverted and retried once before the machine gives up.

use async_trait::async_trait;
use coder_adapters::agent::ExecuteOptions;
use coder_core::{AgentRole, AgentScope, CoderError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{cd_into, invoke_agent, load_state, run_shell, save_state};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanningInput {
    #[serde(default)]
    goal: Option<String>,
}

/// Whether the repo's working tree has any change at all. Planning is
/// only permitted to produce `PLAN.md`, which lives under the workspace's
/// own `.coder/artifacts/`, never inside the repo — so *any* dirty repo
/// state after the planner ran is itself the violation.
async fn repo_is_dirty(repo_path: Option<&str>) -> Result<bool, CoderError> {
    let command = cd_into(repo_path, "git status --porcelain");
    let output = run_shell(&command, 30_000).await?;
    Ok(!output.stdout.trim().is_empty())
}

async fn revert_repo(repo_path: Option<&str>) -> Result<(), CoderError> {
    run_shell(&cd_into(repo_path, "git restore --staged --worktree ."), 30_000).await?;
    run_shell(&cd_into(repo_path, "git clean -fd"), 30_000).await?;
    Ok(())
}

pub struct PlanningMachine;

#[async_trait]
impl Machine for PlanningMachine {
    fn name(&self) -> &'static str {
        "develop.planning"
    }

    async fn execute(&self, input: Value, ctx: &MachineContext) -> MachineOutcome {
        let input: PlanningInput = match serde_json::from_value(input) {
            Ok(v) => v,
            Err(e) => return MachineOutcome::error(format!("invalid planning input: {e}")),
        };

        let mut state = match load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if !state.steps.wrote_issue {
            return MachineOutcome::error(CoderError::PreconditionFailed("issue_draft has not run".to_string()).to_string());
        }
        if state.steps.wrote_plan {
            return MachineOutcome::ok(json!({ "cached": true }));
        }

        let issue_md = coder_storage::artifacts::read(&ctx.workspace, "ISSUE.md").unwrap_or_default().unwrap_or_default();
        let prompt = format!(
            "Draft PLAN.md for this issue. Write only the plan artifact; do not modify any repository file.\n\
             goal: {}\n\n{}",
            input.goal.as_deref().unwrap_or("(none)"),
            issue_md,
        );

        let timeout_ms = ctx.config.workflow.timeouts.planning_ms;
        let mut attempts_remaining = 2;
        loop {
            let response = match invoke_agent(ctx, AgentRole::Planner, AgentScope::Repo, &prompt, ExecuteOptions::default(), timeout_ms).await {
                Ok(r) => r,
                Err(e) => return MachineOutcome::error(e.to_string()),
            };

            if let Err(e) = coder_storage::artifacts::write(&ctx.workspace, "PLAN.md", &response.text) {
                return MachineOutcome::error(e.to_string());
            }

            match repo_is_dirty(state.repo_path.as_deref()).await {
                Ok(false) => break,
                Ok(true) => {
                    attempts_remaining -= 1;
                    if let Err(e) = revert_repo(state.repo_path.as_deref()).await {
                        return MachineOutcome::error(e.to_string());
                    }
                    if attempts_remaining == 0 {
                        return MachineOutcome::error(
                            CoderError::ConstraintViolation(
                                "planner modified repository files outside PLAN.md".to_string(),
                            )
                            .to_string(),
                        );
                    }
                }
                Err(e) => return MachineOutcome::error(e.to_string()),
            }
        }

        state.steps.wrote_plan = true;
        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({ "wrotePlan": true }))
    }
}

#[cfg(test)]
#[path = "planning_tests.rs"]
mod tests;
