// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads `--config <path>` into a [`Config`]. File discovery, schema
//! validation, and project/user-override layering are explicitly out of
//! scope (left to a future external collaborator); this is the thin
//! "read one TOML file" step that has to live somewhere for the binary
//! to be runnable at all.

use std::path::Path;

use coder_core::Config;

use crate::exit_error::ExitError;

/// Loads `path` as TOML into a [`Config`]. Returns the default config
/// (every agent role unmapped) when `path` does not exist, so a
/// from-scratch workspace can still run machines that need no agent.
pub fn load(path: &Path) -> Result<Config, ExitError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ExitError::invalid_config(format!("reading {}: {e}", path.display()))),
    };
    toml::from_str(&text).map_err(|e| ExitError::invalid_config(format!("parsing {}: {e}", path.display())))
}

#[cfg(test)]
#[path = "config_file_tests.rs"]
mod tests;
