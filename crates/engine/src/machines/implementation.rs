// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.implementation`: the programmer agent carries out `PLAN.md`
//! against the checked-out repo. Unlike planning, this machine has no
//! write restriction — making the code changes the plan calls for is
//! exactly its job.

use async_trait::async_trait;
use coder_adapters::agent::ExecuteOptions;
use coder_core::{AgentRole, AgentScope, CoderError, SessionId};
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{invoke_agent, load_state, save_state};

pub struct ImplementationMachine;

#[async_trait]
impl Machine for ImplementationMachine {
    fn name(&self) -> &'static str {
        "develop.implementation"
    }

    async fn execute(&self, _input: Value, ctx: &MachineContext) -> MachineOutcome {
        let mut state = match load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        let plan_reviewed = state.steps.extra.get("planReviewCompleted").and_then(|v| v.as_bool()).unwrap_or(false);
        if !plan_reviewed {
            return MachineOutcome::error(CoderError::PreconditionFailed("plan_review has not run".to_string()).to_string());
        }
        if state.steps.implemented {
            return MachineOutcome::ok(json!({ "cached": true }));
        }

        let plan_md = coder_storage::artifacts::read(&ctx.workspace, "PLAN.md").unwrap_or_default().unwrap_or_default();
        let prompt = format!("Implement the following plan against the checked-out repo.\n\n{plan_md}");

        let options = ExecuteOptions { session_id: Some(SessionId::new()), ..ExecuteOptions::default() };
        let response = match invoke_agent(
            ctx,
            AgentRole::Programmer,
            AgentScope::Repo,
            &prompt,
            options,
            ctx.config.workflow.timeouts.implementation_ms,
        )
        .await
        {
            Ok(r) => r,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        state.steps.implemented = true;
        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({ "implemented": true, "exitCode": response.exit_code }))
    }
}

#[cfg(test)]
#[path = "implementation_tests.rs"]
mod tests;
