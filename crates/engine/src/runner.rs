// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow runner (spec §4.E): sequences a fixed list of machines,
//! persisting a [`LifecycleSnapshot`] on every transition and honoring
//! cancel/pause between steps. Retry is deliberately not orchestrated
//! here — §4.E is explicit that the runner invokes `machine.run` once
//! per step; retry across a whole pipeline pass is the develop loop's
//! job (spec §4.H point 5).

use std::sync::Arc;
use std::time::Duration;

use coder_core::{LifecycleSnapshot, LifecycleState, RunId};
use coder_storage::{lifecycle_store, WorkspacePaths};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::hooks;
use crate::machine::{run_machine, Machine, MachineContext, MachineOutcome, StepResult};

/// 24h hard cap on a paused wait, per spec §4.E step 3b.
const PAUSE_HARD_CAP_MS: u64 = 24 * 60 * 60 * 1000;
/// Interval between pause-state polls.
const PAUSE_POLL_MS: u64 = 1_000;
/// Heartbeat cadence while a run is in progress.
const HEARTBEAT_INTERVAL_MS: u64 = 2_000;

/// Everything an `inputMapper` sees besides the previous step's result.
pub struct StepMeta<'a> {
    pub results: &'a [StepResult],
    pub run_id: RunId,
}

/// One step in a workflow: a machine plus how to build its input from
/// what came before. `optional` steps do not fail the whole workflow on
/// `status:"error"`.
pub struct Step {
    pub machine: Arc<dyn Machine>,
    pub input_mapper: Box<dyn Fn(&MachineOutcome, &StepMeta<'_>) -> Value + Send + Sync>,
    pub optional: bool,
}

impl Step {
    pub fn new(machine: Arc<dyn Machine>, input_mapper: impl Fn(&MachineOutcome, &StepMeta<'_>) -> Value + Send + Sync + 'static) -> Self {
        Self { machine, input_mapper: Box::new(input_mapper), optional: false }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStatus {
    Completed,
    Failed,
    Cancelled,
}

coder_core::simple_display! {
    WorkflowStatus {
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// `{status, results, runId, durationMs}` as specified for the runner's
/// return value; `error` is set only on `Failed`.
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub status: WorkflowStatus,
    pub results: Vec<StepResult>,
    pub run_id: RunId,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl WorkflowResult {
    /// The final step's `data` payload, or `Value::Null` if no step ran
    /// or the workflow ended before producing one.
    pub fn last_data(&self) -> Value {
        self.results.last().map(|r| r.outcome.data()).unwrap_or(Value::Null)
    }
}

/// Sequences [`Step`]s for one workflow invocation, persisting a
/// [`LifecycleSnapshot`] to `workflow-state.json` on every transition.
pub struct WorkflowRunner {
    paths: WorkspacePaths,
    hooks: Vec<coder_core::config::HookConfig>,
}

impl WorkflowRunner {
    pub fn new(paths: WorkspacePaths, hooks: Vec<coder_core::config::HookConfig>) -> Self {
        Self { paths, hooks }
    }

    /// Run `steps` in order under `ctx`. `workflow` names the pipeline
    /// for the lifecycle snapshot (e.g. `"develop"`).
    pub async fn run(&self, workflow: &str, steps: Vec<Step>, initial_input: Value, ctx: &MachineContext) -> WorkflowResult {
        let run_id = ctx.run_id;
        let started = ctx.clock.epoch_ms();
        let snapshot = Arc::new(Mutex::new(LifecycleSnapshot::new(run_id, workflow, started)));
        self.persist(&snapshot, None);
        self.transition(&snapshot, LifecycleState::Running, ctx.clock.epoch_ms(), Some(run_id));

        hooks::dispatch(&self.hooks, "workflow_start", None, None, run_id, &initial_input);

        let heartbeat_stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let heartbeat_task = self.spawn_heartbeat(snapshot.clone(), ctx.clone(), heartbeat_stop.clone());

        let mut results: Vec<StepResult> = Vec::new();
        let mut prev = MachineOutcome::ok(initial_input);
        let mut status = WorkflowStatus::Completed;
        let mut error_message = None;

        for step in steps {
            if ctx.cancel.is_cancelled() {
                status = WorkflowStatus::Cancelled;
                break;
            }
            if !self.wait_while_paused(&ctx.cancel).await {
                status = WorkflowStatus::Cancelled;
                break;
            }

            let machine_name = step.machine.name();
            self.transition(&snapshot, LifecycleState::Running, ctx.clock.epoch_ms(), Some(run_id));
            snapshot.lock().set_stage(machine_name, ctx.clock.epoch_ms());
            self.persist(&snapshot, Some(run_id));
            hooks::dispatch(&self.hooks, "machine_start", Some(machine_name), None, run_id, &Value::Null);

            let meta = StepMeta { results: &results, run_id };
            let input = (step.input_mapper)(&prev, &meta);
            let step_result = run_machine(step.machine.as_ref(), input, ctx).await;

            let (event, status_str) = match &step_result.outcome {
                MachineOutcome::Ok { .. } => ("machine_complete", "ok"),
                MachineOutcome::Skipped => ("machine_complete", "skipped"),
                MachineOutcome::Error { .. } => ("machine_error", "error"),
            };
            hooks::dispatch(&self.hooks, event, Some(machine_name), Some(status_str), run_id, &step_result.outcome.data());

            let is_error = step_result.outcome.is_error();
            let error_text = match &step_result.outcome {
                MachineOutcome::Error { error } => Some(error.clone()),
                _ => None,
            };
            prev = step_result.outcome.clone();
            results.push(step_result);

            if is_error && !step.optional {
                status = WorkflowStatus::Failed;
                error_message = error_text;
                hooks::dispatch(
                    &self.hooks,
                    "workflow_failed",
                    Some(machine_name),
                    Some("failed"),
                    run_id,
                    &json!({"error": error_message}),
                );
                break;
            }
        }

        heartbeat_stop.store(true, std::sync::atomic::Ordering::SeqCst);
        heartbeat_task.abort();

        let final_state = match status {
            WorkflowStatus::Completed => LifecycleState::Completed,
            WorkflowStatus::Failed => LifecycleState::Failed,
            WorkflowStatus::Cancelled => LifecycleState::Cancelled,
        };
        let now = ctx.clock.epoch_ms();
        {
            let mut snap = snapshot.lock();
            if let Some(msg) = &error_message {
                snap.context.error = Some(msg.clone());
            }
        }
        self.transition(&snapshot, final_state, now, Some(run_id));
        if status == WorkflowStatus::Completed {
            hooks::dispatch(&self.hooks, "workflow_complete", None, Some("completed"), run_id, &Value::Null);
        }

        WorkflowResult { status, results, run_id, duration_ms: now.saturating_sub(started), error: error_message }
    }

    /// Poll while `cancel.is_paused()`, returning `false` if cancelled
    /// (mid-pause or otherwise) or the 24h hard cap is reached without
    /// the run ever resuming.
    async fn wait_while_paused(&self, cancel: &coder_core::CancelToken) -> bool {
        let mut waited_ms = 0u64;
        while cancel.is_paused() {
            if cancel.is_cancelled() {
                return false;
            }
            if waited_ms >= PAUSE_HARD_CAP_MS {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(PAUSE_POLL_MS)).await;
            waited_ms += PAUSE_POLL_MS;
        }
        !cancel.is_cancelled()
    }

    fn transition(&self, snapshot: &Arc<Mutex<LifecycleSnapshot>>, next: LifecycleState, at: u64, guard: Option<RunId>) {
        {
            let mut snap = snapshot.lock();
            if let Err(e) = snap.transition(next, at) {
                tracing::warn!(error = %e, "illegal lifecycle transition requested");
                return;
            }
        }
        self.persist(snapshot, guard);
    }

    fn persist(&self, snapshot: &Arc<Mutex<LifecycleSnapshot>>, guard: Option<RunId>) {
        let snap = snapshot.lock().clone();
        if let Err(e) = lifecycle_store::save(&self.paths, &snap, guard) {
            tracing::warn!(error = %e, "failed to persist lifecycle snapshot");
        }
    }

    fn spawn_heartbeat(
        &self,
        snapshot: Arc<Mutex<LifecycleSnapshot>>,
        ctx: MachineContext,
        stop: Arc<std::sync::atomic::AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        let paths = self.paths.clone();
        let run_id = ctx.run_id;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(HEARTBEAT_INTERVAL_MS)).await;
                if stop.load(std::sync::atomic::Ordering::SeqCst) {
                    return;
                }
                let now = ctx.clock.epoch_ms();
                let snap = {
                    let mut snap = snapshot.lock();
                    snap.heartbeat(now);
                    snap.clone()
                };
                // Heartbeat writes are best-effort and never precede the
                // start of a run (the first `persist` above already
                // happened before this task was spawned).
                if let Err(e) = lifecycle_store::save(&paths, &snap, Some(run_id)) {
                    tracing::debug!(error = %e, "heartbeat write skipped");
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
