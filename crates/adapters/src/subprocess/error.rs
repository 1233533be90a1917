// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures raised by the subprocess supervisor. `Timeout` and `Auth`
/// carry the captured output so the adapter layer can redact and
/// truncate it for a user-visible failure.
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("timed out: {reason}")]
    Timeout { reason: String, stdout: String, stderr: String },

    #[error("stderr matched kill pattern: {pattern}")]
    Auth { pattern: String, stdout: String, stderr: String },

    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error("i/o error communicating with child: {0}")]
    Io(String),
}

impl SubprocessError {
    pub fn stdout(&self) -> &str {
        match self {
            SubprocessError::Timeout { stdout, .. } | SubprocessError::Auth { stdout, .. } => stdout,
            _ => "",
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            SubprocessError::Timeout { stderr, .. } | SubprocessError::Auth { stderr, .. } => stderr,
            _ => "",
        }
    }
}
