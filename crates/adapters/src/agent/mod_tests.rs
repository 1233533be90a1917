// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use coder_core::CoderError;

use super::*;

/// A scripted adapter for exercising the trait's default methods without
/// a real subprocess or network call.
struct ScriptedAgent {
    calls: AtomicU32,
    responses: Vec<Result<&'static str, CoderError>>,
}

impl ScriptedAgent {
    fn new(responses: Vec<Result<&'static str, CoderError>>) -> Self {
        Self { calls: AtomicU32::new(0), responses }
    }
}

#[async_trait]
impl AgentAdapter for ScriptedAgent {
    async fn execute(&self, _prompt: &str, _options: &ExecuteOptions) -> Result<AgentResponse, CoderError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        match &self.responses[i.min(self.responses.len() - 1)] {
            Ok(text) => Ok(AgentResponse { text: text.to_string(), exit_code: Some(0) }),
            Err(err) => Err(err.clone()),
        }
    }

    async fn kill(&self) {}
}

fn fast_retry_options() -> RetryOptions {
    RetryOptions { max_attempts: 3, base_delay_ms: 1, max_delay_ms: 2, ..Default::default() }
}

#[tokio::test]
async fn execute_structured_parses_the_raw_response() {
    let agent = ScriptedAgent::new(vec![Ok(r#"{"verdict":"approved"}"#)]);
    let result = agent.execute_structured("prompt", &ExecuteOptions::default()).await.unwrap();
    assert_eq!(result.parsed.unwrap()["verdict"], "approved");
    assert!(result.parse_error.is_none());
}

#[tokio::test]
async fn execute_structured_surfaces_parse_failure_without_erroring() {
    let agent = ScriptedAgent::new(vec![Ok("not json at all")]);
    let result = agent.execute_structured("prompt", &ExecuteOptions::default()).await.unwrap();
    assert!(result.parsed.is_none());
    assert!(result.parse_error.is_some());
}

#[tokio::test]
async fn execute_with_retry_recovers_after_a_rate_limited_attempt() {
    let agent = ScriptedAgent::new(vec![
        Err(CoderError::RateLimited("429 too many requests".into())),
        Ok("done"),
    ]);
    let response = agent.execute_with_retry("prompt", &fast_retry_options()).await.unwrap();
    assert_eq!(response.text, "done");
}

#[tokio::test]
async fn execute_with_retry_gives_up_on_a_terminal_auth_failure() {
    let agent = ScriptedAgent::new(vec![
        Err(CoderError::AuthFailure("session expired".into())),
        Ok("should not be reached"),
    ]);
    let err = agent.execute_with_retry("prompt", &fast_retry_options()).await.unwrap_err();
    assert!(matches!(err, CoderError::AuthFailure(_)));
}

#[tokio::test]
async fn execute_with_retry_retries_a_zero_exit_rate_limited_result() {
    let agent = ScriptedAgent::new(vec![Ok("please slow down, rate limit hit"), Ok("done")]);
    let response = agent.execute_with_retry("prompt", &fast_retry_options()).await.unwrap();
    assert_eq!(response.text, "done");
}

#[tokio::test]
async fn execute_with_retry_leaves_rate_limited_text_alone_when_disabled() {
    let agent = ScriptedAgent::new(vec![Ok("rate limit exceeded"), Ok("done")]);
    let mut options = fast_retry_options();
    options.retry_on_rate_limit = false;
    let response = agent.execute_with_retry("prompt", &options).await.unwrap();
    assert_eq!(response.text, "rate limit exceeded");
}

#[tokio::test]
async fn execute_with_retry_exhausts_attempts_then_returns_last_error() {
    let agent = ScriptedAgent::new(vec![
        Err(CoderError::RateLimited("429".into())),
        Err(CoderError::RateLimited("429".into())),
        Err(CoderError::RateLimited("429".into())),
    ]);
    let err = agent.execute_with_retry("prompt", &fast_retry_options()).await.unwrap_err();
    assert!(matches!(err, CoderError::RateLimited(_)));
}

#[tokio::test]
async fn execute_with_fallback_uses_the_secondary_adapter_on_exhaustion() {
    let primary = ScriptedAgent::new(vec![Err(CoderError::AuthFailure("expired".into()))]);
    let fallback = ScriptedAgent::new(vec![Ok("fallback responded")]);
    let response = primary
        .execute_with_fallback("prompt", &fast_retry_options(), &fallback)
        .await
        .unwrap();
    assert_eq!(response.text, "fallback responded");
}
