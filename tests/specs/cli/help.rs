//! CLI help output specs.

use crate::prelude::*;

#[test]
fn coder_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn coder_develop_help_lists_flags() {
    cli().args(&["develop", "--help"]).passes().stdout_has("--goal").stdout_has("--max-issues");
}

#[test]
fn coder_signal_help_lists_actions() {
    cli().args(&["signal", "--help"]).passes().stdout_has("cancel").stdout_has("pause").stdout_has("resume");
}

#[test]
fn coder_status_help_shows_usage() {
    cli().args(&["status", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn coder_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}
