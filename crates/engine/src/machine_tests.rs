// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use async_trait::async_trait;
use coder_adapters::AgentPool;
use coder_core::{AgentRole, AgentScope, CancelToken, Config, FakeClock, RunId};
use coder_storage::WorkspacePaths;
use serde_json::json;
use tempfile::tempdir;

use super::*;

struct FakeAgentFactory;
impl coder_adapters::AgentFactory for FakeAgentFactory {
    fn build(&self, _role: AgentRole, _scope: AgentScope) -> (String, Arc<dyn coder_adapters::AgentAdapter>) {
        unreachable!("no machine in these tests invokes the agent pool")
    }
}

fn test_context() -> MachineContext {
    let dir = tempdir().unwrap();
    MachineContext {
        run_id: RunId::new(),
        workspace: WorkspacePaths::new(dir.path()),
        agent_pool: Arc::new(AgentPool::new(FakeAgentFactory)),
        cancel: CancelToken::new(),
        clock: DynClock::new(FakeClock::new()),
        config: Arc::new(Config::default()),
    }
}

struct OkMachine;
#[async_trait]
impl Machine for OkMachine {
    fn name(&self) -> &'static str {
        "test.ok"
    }
    async fn execute(&self, input: Value, _ctx: &MachineContext) -> MachineOutcome {
        MachineOutcome::ok(json!({"echo": input}))
    }
}

struct ErrMachine;
#[async_trait]
impl Machine for ErrMachine {
    fn name(&self) -> &'static str {
        "test.err"
    }
    async fn execute(&self, _input: Value, _ctx: &MachineContext) -> MachineOutcome {
        MachineOutcome::error("boom")
    }
}

struct SkippedMachine;
#[async_trait]
impl Machine for SkippedMachine {
    fn name(&self) -> &'static str {
        "test.skipped"
    }
    async fn execute(&self, _input: Value, _ctx: &MachineContext) -> MachineOutcome {
        MachineOutcome::Skipped
    }
}

#[tokio::test]
async fn run_machine_records_ok_outcome_and_duration() {
    let ctx = test_context();
    let result = run_machine(&OkMachine, json!({"a": 1}), &ctx).await;
    assert_eq!(result.machine, "test.ok");
    assert!(matches!(result.outcome, MachineOutcome::Ok { .. }));
    assert_eq!(result.outcome.data(), json!({"echo": {"a": 1}}));
}

#[tokio::test]
async fn run_machine_records_error_outcome() {
    let ctx = test_context();
    let result = run_machine(&ErrMachine, json!(null), &ctx).await;
    assert!(result.outcome.is_error());
    assert_eq!(result.outcome.data(), serde_json::Value::Null);
}

#[tokio::test]
async fn run_machine_records_skipped_outcome() {
    let ctx = test_context();
    let result = run_machine(&SkippedMachine, json!(null), &ctx).await;
    assert!(result.outcome.is_skipped());
}

#[test]
fn machine_outcome_ok_serializes_real_data_never_an_error_for_serializable_input() {
    let outcome = MachineOutcome::ok(json!({"x": 1}));
    match outcome {
        MachineOutcome::Ok { data } => assert_eq!(data, json!({"x": 1})),
        other => panic!("expected Ok, got {other:?}"),
    }
}
