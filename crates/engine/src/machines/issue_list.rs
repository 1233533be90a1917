// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.issue_list`: discover issues to schedule (spec §4.H step 1).
//! The actual tracker integration (`gh`, `glab`, a Linear MCP server, or
//! a local manifest) is an external collaborator per spec §1; this
//! machine's contract is the shape it hands back — `Vec<Issue>` — built
//! from whatever the issueSelector agent or a forced-id filter produces.

use async_trait::async_trait;
use coder_adapters::agent::ExecuteOptions;
use coder_core::{AgentRole, AgentScope, Issue};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::invoke_agent;

#[derive(Debug, Deserialize)]
struct IssueListInput {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    max_issues: Option<u32>,
    #[serde(default)]
    project_filter: Option<String>,
    #[serde(default)]
    local_issues_dir: Option<String>,
    /// When non-empty, bypasses discovery entirely: the caller already
    /// knows which ids it wants.
    #[serde(default)]
    forced_ids: Vec<String>,
}

pub struct IssueListMachine;

#[async_trait]
impl Machine for IssueListMachine {
    fn name(&self) -> &'static str {
        "develop.issue_list"
    }

    async fn execute(&self, input: Value, ctx: &MachineContext) -> MachineOutcome {
        let input: IssueListInput = match serde_json::from_value(input) {
            Ok(v) => v,
            Err(e) => return MachineOutcome::error(format!("invalid issue_list input: {e}")),
        };

        if !input.forced_ids.is_empty() {
            let issues: Vec<Issue> = input
                .forced_ids
                .iter()
                .map(|id| Issue {
                    source: coder_core::IssueSource::Local,
                    id: id.clone(),
                    title: id.clone(),
                    repo_path: None,
                    difficulty: None,
                    depends_on: Vec::new(),
                })
                .collect();
            return MachineOutcome::ok(json!({ "issues": issues }));
        }

        let prompt = format!(
            "List candidate issues as a JSON array of {{source,id,title,repoPath,difficulty,dependsOn}}.\n\
             goal: {}\nprojectFilter: {}\nlocalIssuesDir: {}\nmaxIssues: {}",
            input.goal.as_deref().unwrap_or("(none)"),
            input.project_filter.as_deref().unwrap_or("(none)"),
            input.local_issues_dir.as_deref().unwrap_or("(none)"),
            input.max_issues.map(|n| n.to_string()).unwrap_or_else(|| "(unbounded)".to_string()),
        );

        let response = match invoke_agent(
            ctx,
            AgentRole::IssueSelector,
            AgentScope::Workspace,
            &prompt,
            ExecuteOptions::default(),
            ctx.config.workflow.timeouts.issue_selection_ms,
        )
        .await
        {
            Ok(r) => r,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        match serde_json::from_str::<Vec<Issue>>(response.text.trim()) {
            Ok(mut issues) => {
                if let Some(max) = input.max_issues {
                    issues.truncate(max as usize);
                }
                MachineOutcome::ok(json!({ "issues": issues }))
            }
            Err(e) => MachineOutcome::error(format!("issueSelector response was not a JSON issue array: {e}")),
        }
    }
}

#[cfg(test)]
#[path = "issue_list_tests.rs"]
mod tests;
