// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! coder-storage: the three durable JSON documents under
//! `<workspace>/.coder/` — per-issue state, loop state, and the
//! lifecycle snapshot — plus the control-signal and artifact files that
//! round out the workspace layout. Every write goes through
//! [`atomic::write_atomic`]; callers that need guard-by-runId protection
//! pass it explicitly to [`loop_store::save`] / [`lifecycle_store::save`].

pub mod artifacts;
pub mod atomic;
pub mod control_store;
pub mod error;
pub mod lifecycle_store;
pub mod loop_store;
pub mod paths;
pub mod per_issue;

pub use error::StorageError;
pub use loop_store::{is_pid_alive, is_stale, resolve_takeover, TakeoverDecision, STALE_HEARTBEAT_MS};
pub use paths::WorkspacePaths;
