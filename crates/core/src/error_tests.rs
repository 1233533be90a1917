// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn timeout_and_auth_and_mcp_are_terminal_for_retry() {
    assert!(CoderError::Timeout("t".into()).is_terminal_for_retry());
    assert!(CoderError::AuthFailure("a".into()).is_terminal_for_retry());
    assert!(CoderError::McpStartup("m".into()).is_terminal_for_retry());
}

#[test]
fn rate_limited_and_agent_exit_are_retriable() {
    assert!(!CoderError::RateLimited("r".into()).is_terminal_for_retry());
    assert!(!CoderError::AgentExit {
        code: Some(1),
        message: "boom".into()
    }
    .is_terminal_for_retry());
}

#[test]
fn display_messages_are_human_readable() {
    let e = CoderError::AgentExit {
        code: Some(2),
        message: "bad".into(),
    };
    assert_eq!(e.to_string(), "agent exited with code Some(2): bad");
}
