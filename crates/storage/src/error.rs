// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the durable state stores.

use thiserror::Error;

/// A filesystem failure annotated with which phase of the atomic-write
/// protocol it occurred in, per the spec's `mkdir|write|rename` taxonomy.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mkdir failed for {path}: {source}")]
    Mkdir { path: String, #[source] source: std::io::Error },

    #[error("write failed for {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("rename failed for {path}: {source}")]
    Rename { path: String, #[source] source: std::io::Error },

    #[error("read failed for {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("malformed state at {path}: {source}")]
    Malformed { path: String, #[source] source: serde_json::Error },

    /// Write refused: the caller's `guardRunId` did not match the
    /// `runId` currently stored on disk.
    #[error("guard mismatch: expected runId {expected}, found {found}")]
    GuardMismatch { expected: String, found: String },

    /// Refused to start: an existing run in this workspace is neither
    /// terminal nor stale.
    #[error("workspace has active run: {0}")]
    ActiveRun(String),
}
