// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coder status`: print the current loop state and lifecycle snapshot
//! for a workspace, without taking any lock or starting a run.

use anyhow::{Context, Result};
use coder_storage::WorkspacePaths;

use crate::cli::WorkspaceArgs;

pub fn handle(args: WorkspaceArgs) -> Result<()> {
    let paths = WorkspacePaths::new(args.workspace);

    let loop_state = coder_storage::loop_store::load(&paths).context("reading loop-state.json")?;
    match loop_state {
        None => println!("no loop state recorded for this workspace"),
        Some(state) => {
            let summary = state.summary();
            println!("run {} status={}", state.run_id, state.status);
            println!(
                "  issues: completed={} failed={} skipped={} deferred={} pending={}",
                summary.completed, summary.failed, summary.skipped, summary.deferred, summary.pending
            );
            if let Some(stage) = &state.current_stage {
                println!("  current stage: {stage}");
            }
            if let Some(issue) = state.current_issue() {
                println!("  current issue: {} ({})", issue.issue.id, issue.issue.title);
            }
        }
    }

    if let Some(snapshot) = coder_storage::lifecycle_store::load(&paths).context("reading workflow-state.json")? {
        println!("lifecycle: {} ({})", snapshot.value, snapshot.workflow);
    }

    Ok(())
}
