// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Captures the four inputs [`WorktreeFingerprint::compute`] hashes,
//! straight from `git`'s own porcelain output. Never renormalized before
//! hashing (spec §9 design note on line-ending stability).

use coder_core::{CoderError, WorktreeFingerprint};

use crate::machines::support::{cd_into, run_shell};

/// Capture the current worktree fingerprint for the repo at `repo_path`.
pub async fn capture(repo_path: Option<&str>) -> Result<WorktreeFingerprint, CoderError> {
    let index_state = run_shell(&cd_into(repo_path, "git status --porcelain"), 30_000).await?.stdout;
    let tracked_diff = run_shell(&cd_into(repo_path, "git diff"), 30_000).await?.stdout;
    let staged_diff = run_shell(&cd_into(repo_path, "git diff --cached"), 30_000).await?.stdout;
    let untracked_paths = run_shell(&cd_into(repo_path, "git ls-files --others --exclude-standard"), 30_000).await?.stdout;

    let mut untracked_contents = Vec::new();
    for rel_path in untracked_paths.lines().filter(|l| !l.trim().is_empty()) {
        let full_path = match repo_path {
            Some(root) => std::path::Path::new(root).join(rel_path),
            None => std::path::PathBuf::from(rel_path),
        };
        let contents = std::fs::read_to_string(&full_path).unwrap_or_default();
        untracked_contents.push((rel_path.to_string(), contents));
    }

    Ok(WorktreeFingerprint::compute(&index_state, &tracked_diff, &staged_diff, &untracked_contents))
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
