// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use tempfile::tempdir;

use super::*;

#[test]
fn a_missing_config_file_resolves_to_defaults_rather_than_failing() {
    let dir = tempdir().unwrap();
    let config = load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn a_well_formed_config_file_parses_its_agent_roles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coder.toml");
    std::fs::write(
        &path,
        r#"
[workflow.agentRoles]
planner = "claude-cli"

[models.claude-cli]
model = "claude"
"#,
    )
    .unwrap();

    let config = load(&path).unwrap();
    assert_eq!(config.workflow.agent_roles.get(&coder_core::AgentRole::Planner).map(String::as_str), Some("claude-cli"));
}

#[test]
fn malformed_toml_is_reported_as_an_invalid_configuration_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coder.toml");
    std::fs::write(&path, "not = [valid").unwrap();

    let err = load(&path).unwrap_err();
    assert_eq!(err.code, crate::exit_error::EXIT_INVALID_CONFIG);
}

#[test]
fn loading_a_directory_path_is_an_invalid_configuration_error_not_a_panic() {
    let dir = tempdir().unwrap();
    let err = load(Path::new(dir.path())).unwrap_err();
    assert_eq!(err.code, crate::exit_error::EXIT_INVALID_CONFIG);
}
