// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.issue_draft`: the first step of the develop pipeline proper
//! (spec §4.H point 4.d). Checks out the issue's working branch and
//! writes `ISSUE.md`, the artifact every later stage reads instead of
//! re-deriving the issue shape.

use async_trait::async_trait;
use coder_core::Issue;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{cd_into, run_shell, save_state};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueDraftInput {
    #[serde(flatten)]
    issue: Issue,
    #[serde(default)]
    base_branch: Option<String>,
}

fn branch_name(issue: &Issue) -> String {
    format!("issue/{}-{}", issue.source, sanitize(&issue.id))
}

fn sanitize(id: &str) -> String {
    id.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' }).collect()
}

pub struct IssueDraftMachine;

#[async_trait]
impl Machine for IssueDraftMachine {
    fn name(&self) -> &'static str {
        "develop.issue_draft"
    }

    async fn execute(&self, input: Value, ctx: &MachineContext) -> MachineOutcome {
        let input: IssueDraftInput = match serde_json::from_value(input) {
            Ok(v) => v,
            Err(e) => return MachineOutcome::error(format!("invalid issue_draft input: {e}")),
        };

        let mut state = match crate::machines::support::load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if state.steps.wrote_issue {
            return MachineOutcome::ok(json!({
                "branch": state.branch,
                "repoPath": state.repo_path,
                "cached": true,
            }));
        }

        let branch = branch_name(&input.issue);
        let repo_path = input.issue.repo_path.clone();

        let checkout = cd_into(repo_path.as_deref(), &format!("git checkout -b {branch}"));
        if let Err(e) = run_shell(&checkout, 60_000).await {
            return MachineOutcome::error(format!("failed to create issue branch: {e}"));
        }

        let body = format!(
            "# {title}\n\nsource: {source}\nid: {id}\ndifficulty: {difficulty}\ndependsOn: {deps}\n",
            title = input.issue.title,
            source = input.issue.source,
            id = input.issue.id,
            difficulty = input.issue.difficulty.map(|d| d.to_string()).unwrap_or_else(|| "unset".to_string()),
            deps = input.issue.depends_on.join(", "),
        );
        if let Err(e) = coder_storage::artifacts::write(&ctx.workspace, "ISSUE.md", &body) {
            return MachineOutcome::error(e.to_string());
        }

        state.selected = Some(input.issue.id.clone());
        state.repo_path = repo_path.clone();
        state.branch = Some(branch.clone());
        state.base_branch = input.base_branch.clone();
        state.steps.wrote_issue = true;
        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({ "branch": branch, "repoPath": repo_path }))
    }
}

#[cfg(test)]
#[path = "issue_draft_tests.rs"]
mod tests;
