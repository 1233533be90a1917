// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared request/response shapes for the three agent adapter variants.

use coder_core::SessionId;

/// Everything a single `execute` call needs beyond the prompt text.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub model: Option<String>,
    /// A brand-new named session to start.
    pub session_id: Option<SessionId>,
    /// Continue an existing session rather than starting fresh.
    pub resume_id: Option<SessionId>,
    /// `0` or `None` disables the overall timeout for this call.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    pub text: String,
    pub exit_code: Option<i32>,
}

/// Result of [`crate::agent::AgentAdapter::execute_structured`]. Never
/// raised from the parse step — a malformed response surfaces here as
/// `parsed: None, parse_error: Some(..)` so the caller decides what to
/// do about it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse {
    pub parsed: Option<serde_json::Value>,
    pub parse_error: Option<String>,
    pub raw_text: String,
}

/// Options for [`crate::agent::AgentAdapter::execute_with_retry`] /
/// `execute_with_fallback`.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub execute: ExecuteOptions,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub retry_on_rate_limit: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            execute: ExecuteOptions::default(),
            max_attempts: 5,
            base_delay_ms: 5_000,
            max_delay_ms: 60_000,
            retry_on_rate_limit: true,
        }
    }
}
