// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process and agent adapters (spec §4.A–§4.C): the subprocess
//! supervisor every agent backend is built on, the three concrete
//! `AgentAdapter` variants, and the role/scope-keyed pool that caches
//! them.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod subprocess;

pub use agent::{AgentAdapter, AgentFactory, AgentPool, ApiAgent, CliAgent, McpAgent};
