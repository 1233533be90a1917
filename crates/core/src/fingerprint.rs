// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree fingerprint: a content hash used to detect drift between the
//! end of quality-review and the start of PR creation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest over the git index state, tracked diff,
/// staged diff, and the contents of every untracked-not-ignored file.
/// Git's own porcelain output is treated as canonical and is never
/// renormalized before hashing, even across platforms with differing
/// line endings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorktreeFingerprint(String);

impl WorktreeFingerprint {
    /// Combine the four inputs in a fixed order so the same worktree
    /// state always hashes identically regardless of call-site ordering.
    pub fn compute(
        index_state: &str,
        tracked_diff: &str,
        staged_diff: &str,
        untracked_contents: &[(String, String)],
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"index\0");
        hasher.update(index_state.as_bytes());
        hasher.update(b"\0tracked\0");
        hasher.update(tracked_diff.as_bytes());
        hasher.update(b"\0staged\0");
        hasher.update(staged_diff.as_bytes());
        hasher.update(b"\0untracked\0");
        let mut sorted = untracked_contents.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, contents) in &sorted {
            hasher.update(path.as_bytes());
            hasher.update(b"\0");
            hasher.update(contents.as_bytes());
            hasher.update(b"\0");
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorktreeFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
