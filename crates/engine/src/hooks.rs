// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook dispatch (spec §4.E): fire-and-forget shell commands triggered
//! on workflow/machine lifecycle events, with a hard cap on how long any
//! one hook is allowed to run. A hook failing is logged, never
//! propagated — it is a side channel, not a step in the pipeline.

use std::collections::HashMap;

use coder_adapters::subprocess::{self, RunOptions};
use coder_core::{config::HookConfig, RunId};
use serde_json::Value;

/// Fire-and-forget cap for a single hook invocation.
const HOOK_TIMEOUT_MS: u64 = 30_000;

/// Dispatch every hook whose `on` matches `event` and whose `machine`
/// (if set) matches `machine`. Each matching hook is spawned on its own
/// task; this function returns immediately without waiting on any of
/// them.
pub fn dispatch(
    hooks: &[HookConfig],
    event: &str,
    machine: Option<&str>,
    status: Option<&str>,
    run_id: RunId,
    data: &Value,
) {
    for hook in hooks {
        if hook.on != event {
            continue;
        }
        if let Some(want) = &hook.machine {
            if Some(want.as_str()) != machine {
                continue;
            }
        }

        let command = hook.run.clone();
        let mut secrets = HashMap::new();
        secrets.insert("CODER_HOOK_EVENT".to_string(), event.to_string());
        if let Some(m) = machine {
            secrets.insert("CODER_HOOK_MACHINE".to_string(), m.to_string());
        }
        if let Some(s) = status {
            secrets.insert("CODER_HOOK_STATUS".to_string(), s.to_string());
        }
        secrets.insert("CODER_HOOK_DATA".to_string(), data.to_string());
        secrets.insert("CODER_HOOK_RUN_ID".to_string(), run_id.to_string());

        tokio::spawn(async move {
            let options = RunOptions { timeout_ms: Some(HOOK_TIMEOUT_MS), secrets, ..RunOptions::new() };
            if let Err(e) = subprocess::run(&command, &options).await {
                tracing::warn!(error = %e, command = %command, "hook command failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
