// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the workflow runner, agent layer, and
//! stores. Each variant is a discriminant a caller can match on; the
//! `Display` message is what ends up (redacted) in a machine's
//! `{status:"error", error}` result.

use thiserror::Error;

/// Structured failure kinds produced anywhere in the orchestration stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoderError {
    /// Overall or inactivity deadline exceeded.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Stderr pattern matched a configured auth-failure signature, or the
    /// adapter otherwise detected an expired/rejected session.
    #[error("auth failure: {0}")]
    AuthFailure(String),

    /// A nested MCP server announced failure in its startup banner.
    #[error("mcp startup failure: {0}")]
    McpStartup(String),

    /// Exit-zero-but-rate-limited or a non-zero exit whose output matches
    /// the rate-limit pattern.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Non-zero exit from an agent subprocess, with attempts exhausted.
    #[error("agent exited with code {code:?}: {message}")]
    AgentExit { code: Option<i32>, message: String },

    /// A store write (mkdir/write/rename) failed.
    #[error("state write failed ({phase}): {message}")]
    StateWrite { phase: String, message: String },

    /// A required predecessor stage flag was false.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Fingerprint mismatch between quality-review and pr-creation.
    #[error("worktree drift detected: {0}")]
    WorktreeDrift(String),

    /// Planner (or another machine restricted to specific paths) modified
    /// files outside its allowed write set.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

impl CoderError {
    /// Whether a retrying caller must give up immediately rather than
    /// attempt another backoff round. Auth and startup failures don't
    /// self-heal; a hung subprocess timing out twice in a row rarely
    /// succeeds on a third try either.
    pub fn is_terminal_for_retry(&self) -> bool {
        matches!(
            self,
            CoderError::Timeout(_) | CoderError::AuthFailure(_) | CoderError::McpStartup(_)
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
