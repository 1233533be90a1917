// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-issue reset (spec §4.H "Per-issue reset"): clears durable state
//! and artifacts between issues, checks the working tree back out onto
//! the default branch, and preserves partial work on a failed/skipped
//! issue's own branch before abandoning it.

use coder_core::CoderError;

use crate::machine::MachineContext;
use crate::machines::support::{cd_into, run_shell, shell_quote};

const RESET_TIMEOUT_MS: u64 = 30_000;

async fn repo_is_dirty(repo_path: Option<&str>) -> Result<bool, CoderError> {
    let output = run_shell(&cd_into(repo_path, "git status --porcelain"), RESET_TIMEOUT_MS).await?;
    Ok(!output.stdout.trim().is_empty())
}

fn store_err(e: coder_storage::StorageError) -> CoderError {
    CoderError::StateWrite { phase: "develop_reset".to_string(), message: e.to_string() }
}

/// Reset the workspace for the next issue. `preserve_partial_work` is
/// set when the just-finished issue ended failed/skipped and should not
/// silently lose whatever the agents had already written to disk.
pub async fn reset_workspace(
    ctx: &MachineContext,
    repo_path: Option<&str>,
    default_branch: &str,
    destructive: bool,
    preserve_partial_work: bool,
) -> Result<(), CoderError> {
    if preserve_partial_work && repo_is_dirty(repo_path).await? {
        run_shell(&cd_into(repo_path, "git add -A && git commit -m 'wip: partial work'"), RESET_TIMEOUT_MS).await?;
    }

    run_shell(&cd_into(repo_path, &format!("git checkout {}", shell_quote(default_branch))), RESET_TIMEOUT_MS).await?;

    if destructive {
        run_shell(&cd_into(repo_path, "git restore --staged --worktree ."), RESET_TIMEOUT_MS).await?;
        run_shell(&cd_into(repo_path, "git clean -fd"), RESET_TIMEOUT_MS).await?;
    }

    coder_storage::per_issue::delete(&ctx.workspace).map_err(store_err)?;
    for name in ["ISSUE.md", "PLAN.md", "PLANREVIEW.md"] {
        coder_storage::artifacts::delete(&ctx.workspace, name).map_err(store_err)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
