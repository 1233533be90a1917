// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment filtering: only a small whitelist is inherited from the
//! supervisor's own process, with a caller-supplied secrets map layered
//! on top.

use std::collections::HashMap;

const INHERITED: &[&str] = &[
    "PATH", "HOME", "USER", "LANG", "LC_ALL", "LC_CTYPE", "TMPDIR", "XDG_RUNTIME_DIR",
];

/// Build the environment for a spawned child: the whitelist subset of
/// the current process environment, overlaid with `secrets`.
pub fn build_env(secrets: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for key in INHERITED {
        if let Ok(value) = std::env::var(key) {
            env.insert((*key).to_string(), value);
        }
    }
    for (k, v) in secrets {
        env.insert(k.clone(), v.clone());
    }
    env
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
