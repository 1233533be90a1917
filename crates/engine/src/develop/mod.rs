// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Develop loop supervisor (spec §4.H): dependency-aware queueing of
//! multiple issues, topological scheduling with deferred re-tries,
//! per-issue reset between runs, and dependency-branch resolution. This
//! is the top-level driver most CLI invocations of `develop` go through;
//! each issue it schedules is handed to [`pipeline::run_develop_pipeline`].

pub mod pipeline;
pub mod queue;
pub mod reset;

use coder_adapters::agent::{looks_rate_limited, ExecuteOptions};
use coder_core::config::HookConfig;
use coder_core::loop_state::QueuedIssue;
use coder_core::{
    AgentRole, AgentScope, CoderError, Issue, IssueOutcome, IssueSource, IssueStatus, LoopState,
    LoopSummary, RunStatus,
};
use serde_json::json;

use crate::machine::{run_machine, MachineContext, MachineOutcome};
use crate::machines::support::{cd_into, invoke_agent, run_shell, shell_quote};
use crate::registry::Registry;
use crate::runner::WorkflowStatus;

/// Inputs to one develop-loop invocation (spec §4.H "Inputs"). Test
/// command, ppcommit preset, and per-stage timeouts live on
/// `ctx.config`; only the loop-specific knobs are carried here.
#[derive(Debug, Clone, Default)]
pub struct DevelopLoopInput {
    pub goal: Option<String>,
    pub max_issues: Option<u32>,
    pub project_filter: Option<String>,
    pub local_issues_dir: Option<String>,
    /// Bypasses discovery: process exactly these ids.
    pub forced_ids: Vec<String>,
    pub default_branch: String,
    pub destructive_reset: bool,
}

/// Outcome of one complete develop-loop invocation.
#[derive(Debug, Clone)]
pub struct DevelopLoopResult {
    pub status: RunStatus,
    pub summary: LoopSummary,
    pub loop_state: LoopState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Main,
    Retry,
}

/// Step 1: discover issues via the `develop.issue_list` machine. Its
/// tracker integration (gh/glab/Linear MCP/local manifest) is external
/// per spec §1; this function only knows the machine's `Vec<Issue>`
/// contract.
async fn discover_issues(
    ctx: &MachineContext,
    registry: &Registry,
    input: &DevelopLoopInput,
) -> Result<Vec<Issue>, CoderError> {
    let machine = registry
        .get("develop.issue_list")
        .ok_or_else(|| CoderError::PreconditionFailed("develop.issue_list is not registered".to_string()))?;
    let payload = json!({
        "goal": input.goal,
        "maxIssues": input.max_issues,
        "projectFilter": input.project_filter,
        "localIssuesDir": input.local_issues_dir,
        "forcedIds": input.forced_ids,
    });
    let step = run_machine(machine.as_ref(), payload, ctx).await;
    match step.outcome {
        MachineOutcome::Ok { data } => {
            let issues = data.get("issues").cloned().unwrap_or(serde_json::Value::Null);
            serde_json::from_value(issues)
                .map_err(|e| CoderError::PreconditionFailed(format!("issue_list returned an unexpected shape: {e}")))
        }
        MachineOutcome::Error { error } => Err(CoderError::PreconditionFailed(error)),
        MachineOutcome::Skipped => Ok(Vec::new()),
    }
}

/// Step 3: seed a fresh ordered queue, carrying over any prior run's
/// recorded outcome for an issue that is still present by id match
/// (spec §4.H step 3: "carry over status from a prior interrupted run").
fn seed_queue(ordered: Vec<Issue>, prior: Option<&LoopState>) -> Vec<QueuedIssue> {
    ordered
        .into_iter()
        .map(|issue| {
            let carried = prior.and_then(|p| {
                p.issue_queue.iter().find(|q| q.issue.key() == issue.key()).map(|q| q.outcome.clone())
            });
            match carried {
                Some(outcome) => QueuedIssue { issue, outcome },
                None => QueuedIssue::pending(issue),
            }
        })
        .collect()
}

/// Resolution of an issue's dependency outcomes against the rest of the
/// queue (spec §4.H step 4.a–4.c).
enum DepResolution {
    /// At least one in-set dependency is still pending/deferred.
    Wait,
    /// Every in-set dependency resolved to failed/skipped.
    AllFailed,
    /// Every in-set dependency resolved; `base_branch` is the first
    /// completed dependency's branch, or the repository default.
    Ready { base_branch: String },
}

fn resolve_deps(issue: &Issue, queue: &[QueuedIssue], default_branch: &str) -> DepResolution {
    let deps: Vec<&QueuedIssue> =
        issue.depends_on.iter().filter_map(|id| queue.iter().find(|q| q.issue.id == *id)).collect();
    if deps.is_empty() {
        return DepResolution::Ready { base_branch: default_branch.to_string() };
    }
    if deps.iter().any(|d| matches!(d.outcome.status(), IssueStatus::Pending | IssueStatus::Deferred)) {
        return DepResolution::Wait;
    }
    let all_failed = deps.iter().all(|d| matches!(d.outcome.status(), IssueStatus::Failed | IssueStatus::Skipped));
    if all_failed {
        return DepResolution::AllFailed;
    }
    let base_branch = deps
        .iter()
        .find(|d| d.outcome.status() == IssueStatus::Completed && d.outcome.branch.is_some())
        .and_then(|d| d.outcome.branch.clone())
        .unwrap_or_else(|| default_branch.to_string());
    DepResolution::Ready { base_branch }
}

/// Run one issue through the full six-machine develop pipeline and fold
/// the result back into its queued outcome (spec §4.H step 4.d–4.f).
async fn process_issue(
    ctx: &MachineContext,
    registry: &Registry,
    hooks: &[HookConfig],
    input: &DevelopLoopInput,
    issue: Issue,
    base_branch: String,
    phase: Phase,
) -> IssueOutcome {
    let mut outcome = IssueOutcome::default();

    if let Some(repo_path) = issue.repo_path.as_deref() {
        ctx.agent_pool.set_repo_root(std::path::Path::new(repo_path));
    }

    let checkout = cd_into(issue.repo_path.as_deref(), &format!("git checkout {}", shell_quote(&base_branch)));
    if let Err(e) = run_shell(&checkout, 60_000).await {
        tracing::warn!(issue = %issue.id, error = %e, "failed to check out dependency base branch; proceeding on current HEAD");
    }

    let result = pipeline::run_develop_pipeline(
        ctx,
        registry,
        hooks.to_vec(),
        &issue,
        Some(base_branch.as_str()),
        input.goal.clone(),
    )
    .await;

    // The pipeline's own per-issue state (not the last machine's JSON
    // payload) is the source of truth for the branch/PR url it recorded,
    // since `pr_creation`'s own `Ok` result only carries `prUrl`.
    let persisted = coder_storage::per_issue::load(&ctx.workspace).ok().flatten().unwrap_or_default();

    match result.status {
        WorkflowStatus::Completed => {
            outcome.status = Some(IssueStatus::Completed);
            outcome.branch = persisted.branch.clone();
            outcome.pr_url = persisted.pr_url.clone();
            outcome.base_branch = Some(base_branch);
        }
        WorkflowStatus::Cancelled => {
            outcome.status = Some(IssueStatus::Deferred);
            outcome.error = Some("cancelled".to_string());
            outcome.branch = persisted.branch.clone();
            outcome.base_branch = Some(base_branch);
        }
        WorkflowStatus::Failed => {
            let message = result.error.unwrap_or_else(|| "unknown pipeline failure".to_string());
            // Main pass: a rate-limited failure is deferred rather than
            // terminal (spec §4.H step 4.e). The retry pass treats it as
            // terminal (spec §4.H step 5).
            if phase == Phase::Main && looks_rate_limited(&message) {
                outcome.status = Some(IssueStatus::Deferred);
            } else {
                outcome.status = Some(IssueStatus::Failed);
            }
            outcome.error = Some(message);
            outcome.branch = persisted.branch.clone();
            outcome.base_branch = Some(base_branch);
        }
    }
    outcome
}

fn persist(ctx: &MachineContext, state: &LoopState) {
    if let Err(e) = coder_storage::loop_store::save(&ctx.workspace, state, Some(ctx.run_id)) {
        tracing::warn!(error = %e, "failed to persist loop state");
    }
}

/// Run the full develop loop: discover, schedule, run each issue's
/// pipeline (with a retry pass over deferrals), coalesce, and mark the
/// loop state terminal (spec §4.H steps 1–7).
pub async fn run_develop_loop(
    ctx: &MachineContext,
    registry: &Registry,
    hooks: Vec<HookConfig>,
    input: DevelopLoopInput,
) -> DevelopLoopResult {
    let prior = coder_storage::loop_store::load(&ctx.workspace).ok().flatten();

    let discovered = match discover_issues(ctx, registry, &input).await {
        Ok(issues) => issues,
        Err(e) => {
            tracing::error!(error = %e, "issue discovery failed");
            let mut state = LoopState::new(ctx.run_id, ctx.clock.epoch_ms(), std::process::id());
            state.status = RunStatus::Failed;
            state.completed_at = Some(ctx.clock.epoch_ms());
            persist(ctx, &state);
            return DevelopLoopResult { status: RunStatus::Failed, summary: state.summary(), loop_state: state };
        }
    };

    let ordered = queue::build_queue(discovered);
    if !ordered.cycle_ids.is_empty() {
        tracing::warn!(cycles = ?ordered.cycle_ids, "dependency cycle detected among scheduled issues; all nodes still scheduled");
    }

    let mut state = LoopState::new(ctx.run_id, ctx.clock.epoch_ms(), std::process::id());
    state.issue_queue = seed_queue(ordered.issues, prior.as_ref());

    // Boundary behavior (spec §8): an empty queue completes immediately,
    // no machine invocation, no heartbeat.
    if state.is_empty_queue() {
        state.status = RunStatus::Completed;
        state.completed_at = Some(ctx.clock.epoch_ms());
        persist(ctx, &state);
        return DevelopLoopResult { status: RunStatus::Completed, summary: state.summary(), loop_state: state };
    }

    state.status = RunStatus::Running;
    persist(ctx, &state);

    let cancelled = run_pass(ctx, registry, &hooks, &input, &mut state, Phase::Main).await;
    if !cancelled {
        run_pass(ctx, registry, &hooks, &input, &mut state, Phase::Retry).await;
    }
    if !cancelled {
        coalesce(ctx, &input, &mut state).await;
    }

    state.status = if cancelled { RunStatus::Cancelled } else { RunStatus::Completed };
    state.completed_at = Some(ctx.clock.epoch_ms());
    persist(ctx, &state);

    DevelopLoopResult { status: state.status, summary: state.summary(), loop_state: state }
}

/// One sweep over the queue, processing every issue eligible for this
/// phase. Returns `true` if the sweep ended because the run was
/// cancelled.
async fn run_pass(
    ctx: &MachineContext,
    registry: &Registry,
    hooks: &[HookConfig],
    input: &DevelopLoopInput,
    state: &mut LoopState,
    phase: Phase,
) -> bool {
    for index in 0..state.issue_queue.len() {
        if ctx.cancel.is_cancelled() {
            ctx.agent_pool.kill_all().await;
            return true;
        }

        let current_status = state.issue_queue[index].outcome.status();
        let eligible = match phase {
            Phase::Main => current_status == IssueStatus::Pending,
            Phase::Retry => current_status == IssueStatus::Deferred,
        };
        if !eligible {
            continue;
        }

        let snapshot = state.issue_queue.clone();
        let issue = state.issue_queue[index].issue.clone();
        let resolution = resolve_deps(&issue, &snapshot, &input.default_branch);

        state.current_index = index;
        state.current_stage = Some("develop.pipeline".to_string());
        state.current_stage_started_at = Some(ctx.clock.epoch_ms());
        state.last_heartbeat_at = Some(ctx.clock.epoch_ms());

        let (outcome, attempted) = match resolution {
            DepResolution::Wait => {
                let mut outcome = state.issue_queue[index].outcome.clone();
                if phase == Phase::Main {
                    outcome.status = Some(IssueStatus::Deferred);
                }
                (outcome, false)
            }
            DepResolution::AllFailed => {
                let outcome = IssueOutcome {
                    status: Some(IssueStatus::Skipped),
                    error: Some("all dependencies failed".to_string()),
                    ..state.issue_queue[index].outcome.clone()
                };
                (outcome, false)
            }
            DepResolution::Ready { base_branch } => {
                let outcome = process_issue(ctx, registry, hooks, input, issue.clone(), base_branch, phase).await;
                (outcome, true)
            }
        };

        let failed_or_skipped = matches!(outcome.status(), IssueStatus::Failed | IssueStatus::Skipped);
        state.issue_queue[index].outcome = outcome;
        persist(ctx, state);

        if attempted {
            if let Err(e) = reset::reset_workspace(
                ctx,
                issue.repo_path.as_deref(),
                &input.default_branch,
                input.destructive_reset,
                failed_or_skipped,
            )
            .await
            {
                tracing::warn!(issue = %issue.id, error = %e, "per-issue reset failed");
            }
        }
    }
    false
}

/// Step 6: when ≥2 issues completed on distinct branches, ask the
/// reviewer agent to look at the combined diffs and write
/// `COALESCE.md`; then delete branches of failed/skipped issues that
/// never diverged from the default branch.
async fn coalesce(ctx: &MachineContext, input: &DevelopLoopInput, state: &mut LoopState) {
    let completed_branches: Vec<(String, String)> = state
        .issue_queue
        .iter()
        .filter(|q| q.outcome.status() == IssueStatus::Completed)
        .filter_map(|q| q.outcome.branch.clone().map(|b| (q.issue.id.clone(), b)))
        .collect();

    let mut distinct: Vec<&(String, String)> = Vec::new();
    for entry in &completed_branches {
        if !distinct.iter().any(|(_, b)| *b == entry.1) {
            distinct.push(entry);
        }
    }

    if distinct.len() >= 2 {
        let repo_path = state
            .issue_queue
            .iter()
            .find(|q| q.outcome.status() == IssueStatus::Completed)
            .and_then(|q| q.issue.repo_path.clone());

        let mut combined = String::new();
        for (issue_id, branch) in &distinct {
            let cmd = format!("git diff {}...{}", shell_quote(&input.default_branch), shell_quote(branch));
            match run_shell(&cd_into(repo_path.as_deref(), &cmd), 60_000).await {
                Ok(output) => combined.push_str(&format!("## {issue_id} ({branch})\n\n{}\n\n", output.stdout)),
                Err(e) => tracing::warn!(branch = %branch, error = %e, "failed to diff branch for coalesce review"),
            }
        }

        let prompt = format!("Review the combined diffs of this develop-loop run and summarize risks/conflicts:\n\n{combined}");
        let timeout_ms = ctx.config.workflow.timeouts.review_round_ms;
        match invoke_agent(ctx, AgentRole::Reviewer, AgentScope::Workspace, &prompt, ExecuteOptions::default(), timeout_ms).await {
            Ok(response) => {
                if let Err(e) = coder_storage::artifacts::write(&ctx.workspace, "COALESCE.md", &response.text) {
                    tracing::warn!(error = %e, "failed to write COALESCE.md");
                }
            }
            Err(e) => tracing::warn!(error = %e, "coalesce review invocation failed"),
        }
    }

    let default_branch = input.default_branch.clone();
    let deletable: Vec<(Option<String>, String)> = state
        .issue_queue
        .iter()
        .filter(|q| matches!(q.outcome.status(), IssueStatus::Failed | IssueStatus::Skipped))
        .filter_map(|q| q.outcome.branch.clone().map(|b| (q.issue.repo_path.clone(), b)))
        .collect();

    for (repo_path, branch) in deletable {
        let count_cmd = format!("git rev-list --count {}..{}", shell_quote(&default_branch), shell_quote(&branch));
        let Ok(output) = run_shell(&cd_into(repo_path.as_deref(), &count_cmd), 30_000).await else { continue };
        if output.stdout.trim() == "0" {
            let _ = run_shell(&cd_into(repo_path.as_deref(), &format!("git branch -D {}", shell_quote(&branch))), 30_000).await;
        }
    }
}

/// Build a bare local-source issue outside the `develop.issue_list`
/// machine boundary. Used by forced-id callers (tests, CLI `--issue`
/// flags) that already know exactly which id to schedule.
pub fn local_issue(id: impl Into<String>, title: impl Into<String>) -> Issue {
    Issue {
        source: IssueSource::Local,
        id: id.into(),
        title: title.into(),
        repo_path: None,
        difficulty: None,
        depends_on: Vec::new(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
