//! `coder develop` config handling: invalid configuration is reported
//! before any agent or workspace state is touched (spec §6 exit codes).

use crate::prelude::*;

#[test]
fn malformed_config_file_exits_with_invalid_config_code() {
    let ws = Workspace::empty();
    ws.file("coder.toml", "not = [valid");

    ws.coder().args(&["develop"]).fails().code_eq(2);
}

#[test]
fn agent_role_pointing_at_an_unconfigured_backend_exits_with_invalid_config_code() {
    let ws = Workspace::empty();
    ws.file(
        "coder.toml",
        r#"
[workflow.agentRoles]
planner = "claude-cli"
"#,
    );

    // "claude-cli" is never defined under [models.*], so validation
    // must fail before the develop loop ever discovers an issue.
    let result = ws.coder().args(&["develop"]).fails();
    result.code_eq(2).stderr_has("claude-cli");
}

#[test]
fn missing_config_file_falls_back_to_defaults_and_reaches_issue_discovery() {
    let ws = Workspace::empty();

    // No coder.toml, no `develop.issue_list` tracker configured: the
    // config layer itself must not be what fails this run. It should
    // get as far as issue discovery before erroring out.
    let result = ws.coder().args(&["develop"]).run();
    assert_ne!(result.code(), Some(2), "stderr: {}", result.stderr());
}
