// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `runDevelopPipeline` (spec §4.H step 4.d): the six-machine sequence
//! run once per issue, wired up through the same [`WorkflowRunner`]
//! every other pipeline in this crate uses.

use coder_core::{CoderError, Issue};
use serde_json::{json, Value};

use crate::machine::MachineContext;
use crate::registry::Registry;
use crate::runner::{Step, StepMeta, WorkflowResult, WorkflowRunner, WorkflowStatus};
use crate::machine::MachineOutcome;

const PIPELINE_MACHINES: [&str; 6] = [
    "develop.issue_draft",
    "develop.planning",
    "develop.plan_review",
    "develop.implementation",
    "develop.quality_review",
    "develop.pr_creation",
];

fn issue_draft_input(issue: &Issue, base_branch: Option<&str>) -> Value {
    let mut value = serde_json::to_value(issue).unwrap_or_else(|_| json!({}));
    if let Value::Object(ref mut map) = value {
        map.insert("baseBranch".to_string(), json!(base_branch));
    }
    value
}

fn build_steps(registry: &Registry, goal: Option<String>) -> Result<Vec<Step>, CoderError> {
    let mut steps = Vec::with_capacity(PIPELINE_MACHINES.len());
    for name in PIPELINE_MACHINES {
        let machine = registry
            .get(name)
            .ok_or_else(|| CoderError::PreconditionFailed(format!("machine {name} is not registered")))?;
        let step = match name {
            "develop.issue_draft" => {
                Step::new(machine, |prev: &MachineOutcome, _meta: &StepMeta<'_>| prev.data())
            }
            "develop.planning" => {
                let goal = goal.clone();
                Step::new(machine, move |_prev, _meta| json!({ "goal": goal.clone() }))
            }
            _ => Step::new(machine, |_prev, _meta| json!({})),
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Run the issue_draft → planning → plan_review → implementation →
/// quality_review → pr_creation sequence for one issue against the
/// currently checked-out repo.
pub async fn run_develop_pipeline(
    ctx: &MachineContext,
    registry: &Registry,
    hooks: Vec<coder_core::config::HookConfig>,
    issue: &Issue,
    base_branch: Option<&str>,
    goal: Option<String>,
) -> WorkflowResult {
    let steps = match build_steps(registry, goal) {
        Ok(steps) => steps,
        Err(e) => {
            return WorkflowResult {
                status: WorkflowStatus::Failed,
                results: Vec::new(),
                run_id: ctx.run_id,
                duration_ms: 0,
                error: Some(e.to_string()),
            }
        }
    };

    let runner = WorkflowRunner::new(ctx.workspace.clone(), hooks);
    let initial_input = issue_draft_input(issue, base_branch);
    runner.run("develop", steps, initial_input, ctx).await
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
