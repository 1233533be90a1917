// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.plan_review`: a single review pass over `PLAN.md` before any
//! code is written. Lighter-weight than the quality-review loop (spec
//! §4.I) — one round, no committer escalation — but the same
//! last-match verdict convention, since both artifacts are produced by
//! the same reviewing agent persona.

use async_trait::async_trait;
use coder_adapters::agent::ExecuteOptions;
use coder_core::{AgentRole, AgentScope, CoderError};
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{invoke_agent, load_state, save_state};
use crate::review::verdict::{parse_verdict, Verdict};

pub struct PlanReviewMachine;

#[async_trait]
impl Machine for PlanReviewMachine {
    fn name(&self) -> &'static str {
        "develop.plan_review"
    }

    async fn execute(&self, _input: Value, ctx: &MachineContext) -> MachineOutcome {
        let mut state = match load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if !state.steps.wrote_plan {
            return MachineOutcome::error(CoderError::PreconditionFailed("planning has not run".to_string()).to_string());
        }
        if state.steps.extra.get("planReviewCompleted").and_then(|v| v.as_bool()).unwrap_or(false) {
            return MachineOutcome::ok(json!({ "cached": true }));
        }

        let plan_md = coder_storage::artifacts::read(&ctx.workspace, "PLAN.md").unwrap_or_default().unwrap_or_default();
        let prompt = format!(
            "Review PLAN.md below. Write PLANREVIEW.md ending with a line\n\
             `## VERDICT: APPROVED` or `## VERDICT: REVISE`.\n\n{plan_md}"
        );

        let response = match invoke_agent(
            ctx,
            AgentRole::PlanReviewer,
            AgentScope::Repo,
            &prompt,
            ExecuteOptions::default(),
            ctx.config.workflow.timeouts.plan_review_ms,
        )
        .await
        {
            Ok(r) => r,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if let Err(e) = coder_storage::artifacts::write(&ctx.workspace, "PLANREVIEW.md", &response.text) {
            return MachineOutcome::error(e.to_string());
        }

        let verdict = parse_verdict(&response.text);
        state.steps.extra.insert("planReviewCompleted".to_string(), json!(true));
        state.steps.extra.insert("planReviewVerdict".to_string(), json!(verdict.as_str()));
        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({ "verdict": verdict.as_str(), "approved": verdict == Verdict::Approved }))
    }
}

#[cfg(test)]
#[path = "plan_review_tests.rs"]
mod tests;
