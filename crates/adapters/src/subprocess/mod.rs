// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess supervisor (spec §4.A): spawn, stream, timeout, kill.

mod capture;
mod env;
mod error;
mod supervisor;

pub use error::SubprocessError;
pub use supervisor::{kill_group, run, run_tracked, spawn_detached, PgidTracker, RunOptions, RunOutput};
