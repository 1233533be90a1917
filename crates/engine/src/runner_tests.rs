// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coder_adapters::AgentPool;
use coder_core::{AgentRole, AgentScope, CancelToken, Config, FakeClock, RunId};
use coder_storage::WorkspacePaths;
use serde_json::{json, Value};
use tempfile::tempdir;

use super::*;
use crate::machine::{Machine, MachineContext, MachineOutcome};

struct NoAgents;
impl coder_adapters::AgentFactory for NoAgents {
    fn build(&self, _role: AgentRole, _scope: AgentScope) -> (String, Arc<dyn coder_adapters::AgentAdapter>) {
        unreachable!("runner tests never invoke the agent pool")
    }
}

fn test_context() -> (MachineContext, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let ctx = MachineContext {
        run_id: RunId::new(),
        workspace: WorkspacePaths::new(dir.path()),
        agent_pool: Arc::new(AgentPool::new(NoAgents)),
        cancel: CancelToken::new(),
        clock: crate::machine::DynClock::new(FakeClock::new()),
        config: Arc::new(Config::default()),
    };
    (ctx, dir)
}

struct CountingMachine {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    fails: bool,
}

#[async_trait]
impl Machine for CountingMachine {
    fn name(&self) -> &'static str {
        self.name
    }
    async fn execute(&self, input: Value, _ctx: &MachineContext) -> MachineOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            MachineOutcome::error(format!("{} failed", self.name))
        } else {
            MachineOutcome::ok(json!({"saw": input}))
        }
    }
}

fn pass_through() -> Box<dyn Fn(&MachineOutcome, &StepMeta<'_>) -> Value + Send + Sync> {
    Box::new(|prev, _meta| prev.data())
}

#[tokio::test]
async fn runs_every_step_in_order_and_completes() {
    let (ctx, _dir) = test_context();
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let steps = vec![
        Step { machine: Arc::new(CountingMachine { name: "a", calls: calls.clone(), fails: false }), input_mapper: pass_through(), optional: false },
        Step { machine: Arc::new(CountingMachine { name: "b", calls: calls.clone(), fails: false }), input_mapper: pass_through(), optional: false },
    ];

    let result = runner.run("develop", steps, json!({"start": true}), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Completed);
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].machine, "a");
    assert_eq!(result.results[1].machine, "b");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn a_failing_required_step_stops_the_pipeline() {
    let (ctx, _dir) = test_context();
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let steps = vec![
        Step { machine: Arc::new(CountingMachine { name: "a", calls: calls.clone(), fails: true }), input_mapper: pass_through(), optional: false },
        Step { machine: Arc::new(CountingMachine { name: "b", calls: calls.clone(), fails: false }), input_mapper: pass_through(), optional: false },
    ];

    let result = runner.run("develop", steps, json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Failed);
    assert_eq!(result.results.len(), 1, "step b must never run after a required step fails");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(result.error.unwrap().contains("a failed"));
}

#[tokio::test]
async fn an_optional_failing_step_does_not_stop_the_pipeline() {
    let (ctx, _dir) = test_context();
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let steps = vec![
        Step { machine: Arc::new(CountingMachine { name: "a", calls: calls.clone(), fails: true }), input_mapper: pass_through(), optional: true },
        Step { machine: Arc::new(CountingMachine { name: "b", calls: calls.clone(), fails: false }), input_mapper: pass_through(), optional: false },
    ];

    let result = runner.run("develop", steps, json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Completed);
    assert_eq!(result.results.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancel_before_any_step_returns_cancelled_without_running_machines() {
    let (ctx, _dir) = test_context();
    ctx.cancel.cancel();
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let steps = vec![Step {
        machine: Arc::new(CountingMachine { name: "a", calls: calls.clone(), fails: false }),
        input_mapper: pass_through(),
        optional: false,
    }];

    let result = runner.run("develop", steps, json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert!(result.results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_between_steps_stops_before_the_next_machine_starts() {
    let (ctx, _dir) = test_context();
    let calls = Arc::new(AtomicUsize::new(0));
    let cancel = ctx.cancel.clone();
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());

    struct CancelAfter {
        calls: Arc<AtomicUsize>,
        cancel: CancelToken,
    }
    #[async_trait]
    impl Machine for CancelAfter {
        fn name(&self) -> &'static str {
            "cancel_after"
        }
        async fn execute(&self, _input: Value, _ctx: &MachineContext) -> MachineOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cancel.cancel();
            MachineOutcome::ok(Value::Null)
        }
    }

    let steps = vec![
        Step { machine: Arc::new(CancelAfter { calls: calls.clone(), cancel }), input_mapper: pass_through(), optional: false },
        Step {
            machine: Arc::new(CountingMachine { name: "never", calls: calls.clone(), fails: false }),
            input_mapper: pass_through(),
            optional: false,
        },
    ];

    let result = runner.run("develop", steps, json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert_eq!(result.results.len(), 1, "the second machine must never start once cancelled");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pause_then_resume_allows_the_workflow_to_complete() {
    let (ctx, _dir) = test_context();
    ctx.cancel.pause();
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let steps = vec![Step {
        machine: Arc::new(CountingMachine { name: "a", calls: calls.clone(), fails: false }),
        input_mapper: pass_through(),
        optional: false,
    }];

    let resume_cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        resume_cancel.resume();
    });

    let result = runner.run("develop", steps, json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Completed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_step_list_completes_immediately() {
    let (ctx, _dir) = test_context();
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());

    let result = runner.run("develop", Vec::new(), json!(null), &ctx).await;

    assert_eq!(result.status, WorkflowStatus::Completed);
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn persists_a_lifecycle_snapshot_that_reflects_the_final_status() {
    let (ctx, _dir) = test_context();
    let runner = WorkflowRunner::new(ctx.workspace.clone(), Vec::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let steps = vec![Step {
        machine: Arc::new(CountingMachine { name: "a", calls, fails: false }),
        input_mapper: pass_through(),
        optional: false,
    }];

    let result = runner.run("develop", steps, json!(null), &ctx).await;
    assert_eq!(result.status, WorkflowStatus::Completed);

    let snapshot = coder_storage::lifecycle_store::load(&ctx.workspace).unwrap().expect("snapshot persisted");
    assert_eq!(snapshot.run_id, ctx.run_id);
    assert_eq!(snapshot.value, coder_core::LifecycleState::Completed);
    assert_eq!(snapshot.workflow, "develop");
}
