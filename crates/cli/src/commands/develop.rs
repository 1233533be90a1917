// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coder develop`: load config, resolve agent backends, take over a
//! stale prior run if one is found, then drive the develop loop to
//! completion (spec §4.H).

use std::sync::Arc;

use coder_adapters::AgentPool;
use coder_core::{CancelToken, Clock, RunId, SystemClock};
use coder_engine::develop::{run_develop_loop, DevelopLoopInput};
use coder_engine::machine::{DynClock, MachineContext};
use coder_engine::machines::register_all;
use coder_engine::registry::Registry;
use coder_storage::{resolve_takeover, is_pid_alive, TakeoverDecision, WorkspacePaths};

use crate::cli::DevelopArgs;
use crate::exit_error::{ExitError, EXIT_FAILURE, EXIT_SUCCESS};
use crate::factory::ConfiguredAgentFactory;

pub async fn handle(args: DevelopArgs) -> Result<i32, ExitError> {
    let config = crate::config_file::load(&args.config)?;
    let config = Arc::new(config);

    let factory = ConfiguredAgentFactory::new(
        config.workflow.agent_roles.clone(),
        config.models.clone(),
    );
    factory.validate()?;

    let paths = WorkspacePaths::new(args.workspace.workspace.clone());
    let now = SystemClock.epoch_ms();
    let run_id = match resolve_takeover(&paths, now, is_pid_alive) {
        Ok(TakeoverDecision::Clear) => RunId::new(),
        Ok(TakeoverDecision::TookOver { previous_run_id }) => {
            tracing::warn!(previous_run_id = %previous_run_id, "took over a stale run");
            RunId::new()
        }
        Ok(TakeoverDecision::Refuse { active_run_id }) => {
            return Err(ExitError::new(
                EXIT_FAILURE,
                format!("workspace has active run {active_run_id}"),
            ));
        }
        Err(e) => return Err(ExitError::new(EXIT_FAILURE, format!("checking for a prior run: {e}"))),
    };

    let cancel = CancelToken::new();
    let bridge = crate::control_bridge::spawn(paths.clone(), run_id, cancel.clone());

    let agent_pool = Arc::new(AgentPool::new(factory));
    let ctx = MachineContext {
        run_id,
        workspace: paths,
        agent_pool,
        cancel: cancel.clone(),
        clock: DynClock::new(SystemClock),
        config: config.clone(),
    };

    let mut registry = Registry::new();
    register_all(&mut registry);

    let input = DevelopLoopInput {
        goal: args.goal,
        max_issues: args.max_issues,
        project_filter: args.project_filter,
        local_issues_dir: args.local_issues_dir,
        forced_ids: args.forced_ids,
        default_branch: args.default_branch,
        destructive_reset: args.destructive_reset,
    };

    let result = run_develop_loop(&ctx, &registry, config.workflow.hooks.clone(), input).await;
    ctx.agent_pool.kill_all().await;
    bridge.abort();

    print_summary(&result.summary);

    let exit = match result.status {
        coder_core::RunStatus::Completed => EXIT_SUCCESS,
        coder_core::RunStatus::Cancelled => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    };
    Ok(exit)
}

fn print_summary(summary: &coder_core::LoopSummary) {
    println!(
        "completed={} failed={} skipped={} deferred={} pending={}",
        summary.completed, summary.failed, summary.skipped, summary.deferred, summary.pending
    );
}
