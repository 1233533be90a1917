// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Machine` trait (spec §4.D): one named, schema-described unit of
//! work in a workflow, plus the context every machine executes under.

use std::sync::Arc;

use async_trait::async_trait;
use coder_adapters::AgentPool;
use coder_core::{CancelToken, Clock, Config, RunId};
use coder_storage::WorkspacePaths;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A type-erased [`Clock`]. `Clock` itself requires `Clone`, which is not
/// object-safe, so this wraps a concrete clock behind a closure once and
/// lets it travel through `Arc<dyn Machine>` registries and contexts that
/// are built without knowing which clock implementation backs them.
#[derive(Clone)]
pub struct DynClock(Arc<dyn Fn() -> u64 + Send + Sync>);

impl DynClock {
    pub fn new<C: Clock + 'static>(clock: C) -> Self {
        Self(Arc::new(move || clock.epoch_ms()))
    }

    pub fn epoch_ms(&self) -> u64 {
        (self.0)()
    }
}

/// Everything a machine needs beyond its input: the run identity, the
/// workspace it is operating in, the agent pool it draws backends from,
/// the cancel/pause signal, the wall clock, and the resolved config.
#[derive(Clone)]
pub struct MachineContext {
    pub run_id: RunId,
    pub workspace: WorkspacePaths,
    pub agent_pool: Arc<AgentPool>,
    pub cancel: CancelToken,
    pub clock: DynClock,
    pub config: Arc<Config>,
}

/// `{status: "ok", data} | {status: "error", error} | {status: "skipped"}`,
/// matching the spec's machine result shape verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MachineOutcome {
    Ok { data: Value },
    Error { error: String },
    Skipped,
}

impl MachineOutcome {
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => MachineOutcome::Ok { data },
            Err(e) => MachineOutcome::Error { error: format!("failed to serialize machine output: {e}") },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        MachineOutcome::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MachineOutcome::Error { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MachineOutcome::Skipped)
    }

    /// The `data` payload of an `Ok` outcome, or `Value::Null` otherwise —
    /// the shape an `inputMapper` downstream can always destructure from
    /// without matching on the outcome variant itself.
    pub fn data(&self) -> Value {
        match self {
            MachineOutcome::Ok { data } => data.clone(),
            _ => Value::Null,
        }
    }
}

/// One named unit of work in a workflow. Registered globally by dotted
/// name (e.g. `develop.planning`) and invoked through [`crate::registry::Registry`].
///
/// Implementations are expected to be idempotent on re-execution: a
/// machine checks `ctx`'s persisted per-issue step flags before doing
/// real work, and short-circuits with the cached result if its step
/// already completed. That check is the machine's own responsibility,
/// not the registry's or the runner's.
#[async_trait]
pub trait Machine: Send + Sync {
    /// Dotted registry name, e.g. `develop.planning`.
    fn name(&self) -> &'static str;

    /// Run this machine. Never panics and never returns a raised error —
    /// any failure is reported as `MachineOutcome::Error`.
    async fn execute(&self, input: Value, ctx: &MachineContext) -> MachineOutcome;
}

/// One step's recorded execution: which machine ran, what it returned,
/// and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub machine: String,
    pub outcome: MachineOutcome,
    pub duration_ms: u64,
}

/// Invoke `machine`, timing the call on `ctx.clock` and logging entry and
/// exit. This is the "base `run` wrapper" from spec §4.D: schema
/// validation is left to each machine (no generic JSON-schema validator
/// is part of this stack), but duration recording and structured logging
/// are uniform across every machine invocation.
pub async fn run_machine(machine: &dyn Machine, input: Value, ctx: &MachineContext) -> StepResult {
    let started = ctx.clock.epoch_ms();
    tracing::debug!(machine = machine.name(), run_id = %ctx.run_id, "machine_start");
    let outcome = machine.execute(input, ctx).await;
    let duration_ms = ctx.clock.epoch_ms().saturating_sub(started);
    match &outcome {
        MachineOutcome::Ok { .. } => {
            tracing::debug!(machine = machine.name(), run_id = %ctx.run_id, duration_ms, "machine_complete")
        }
        MachineOutcome::Skipped => {
            tracing::debug!(machine = machine.name(), run_id = %ctx.run_id, duration_ms, "machine_skipped")
        }
        MachineOutcome::Error { error } => {
            tracing::warn!(machine = machine.name(), run_id = %ctx.run_id, duration_ms, error, "machine_error")
        }
    }
    StepResult { machine: machine.name().to_string(), outcome, duration_ms }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
