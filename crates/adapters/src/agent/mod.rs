// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent adapter layer (spec §4.B/§4.C): a shared trait object over the
//! three concrete backends, structured-output extraction, retry/backoff,
//! and the role/scope-keyed pool that caches live instances.

mod api;
mod cli;
mod mcp;
mod pool;
mod retry;
mod shell;
mod structured;
mod types;

pub use api::ApiAgent;
pub use cli::CliAgent;
pub use mcp::McpAgent;
pub use pool::{AgentFactory, AgentPool};
pub use retry::{backoff_delay_ms, looks_rate_limited};
pub use types::{AgentResponse, ExecuteOptions, RetryOptions, StructuredResponse};

use async_trait::async_trait;
use coder_core::CoderError;

/// Shared contract implemented by `CliAgent`, `ApiAgent`, and `McpAgent`.
///
/// `execute` is the only method a backend must provide; the rest are
/// default implementations layered on top of it, matching the teacher's
/// pattern of putting shared orchestration in the trait and only the
/// wire-level specifics in each impl.
#[async_trait]
pub trait AgentAdapter: Send + Sync {
    /// Run one prompt through this backend and return its raw response.
    async fn execute(&self, prompt: &str, options: &ExecuteOptions) -> Result<AgentResponse, CoderError>;

    /// Forcibly terminate any subprocess or connection this adapter
    /// currently owns. A no-op for adapters with nothing in flight.
    async fn kill(&self);

    /// Repoint a repo-scoped adapter at a new working directory in
    /// place, so the pool's cache entry survives a repo-root change.
    /// Adapters with no notion of a working directory (API, MCP) leave
    /// this a no-op.
    fn set_cwd(&self, _path: &std::path::Path) {}

    /// `execute`, then run the response text through the layered
    /// structured-JSON extractor. Never fails on a parse miss — the
    /// caller gets `parsed: None, parse_error: Some(..)` instead.
    async fn execute_structured(
        &self,
        prompt: &str,
        options: &ExecuteOptions,
    ) -> Result<StructuredResponse, CoderError> {
        let response = self.execute(prompt, options).await?;
        let (parsed, parse_error) = structured::parse(&response.text);
        Ok(StructuredResponse { parsed, parse_error, raw_text: response.text })
    }

    /// `execute`, retrying on any non-terminal error, or on a
    /// zero-exit-but-rate-limited result when `retry_on_rate_limit` is
    /// set, with exponential backoff up to `options.max_attempts`.
    async fn execute_with_retry(
        &self,
        prompt: &str,
        options: &RetryOptions,
    ) -> Result<AgentResponse, CoderError> {
        let mut attempt = 1;
        loop {
            let outcome = self.execute(prompt, &options.execute).await;
            let should_retry = match &outcome {
                Ok(response) => options.retry_on_rate_limit && looks_rate_limited(&response.text),
                Err(err) => !err.is_terminal_for_retry(),
            };
            if !should_retry || attempt >= options.max_attempts {
                return outcome;
            }
            let delay = backoff_delay_ms(attempt, options.base_delay_ms, options.max_delay_ms);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }

    /// `execute_with_retry` against this adapter, falling back to
    /// `fallback` if every attempt on `self` is exhausted or terminal.
    async fn execute_with_fallback(
        &self,
        prompt: &str,
        options: &RetryOptions,
        fallback: &dyn AgentAdapter,
    ) -> Result<AgentResponse, CoderError> {
        match self.execute_with_retry(prompt, options).await {
            Ok(response) => Ok(response),
            Err(_) => fallback.execute_with_retry(prompt, options).await,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
