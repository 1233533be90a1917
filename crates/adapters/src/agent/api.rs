// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API agent variant (spec §4.B): a single HTTP POST per `execute` call,
//! timeout enforced via a cancellation signal, JSON response text-extracted.

use async_trait::async_trait;
use coder_core::CoderError;
use serde_json::json;

use super::{AgentAdapter, AgentResponse, ExecuteOptions};

/// Drives a hosted model API directly over HTTP, bypassing any local CLI.
pub struct ApiAgent {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
    client: reqwest::Client,
}

impl ApiAgent {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_ms: 10 * 60_000,
            client: reqwest::Client::new(),
        }
    }

    fn body(&self, prompt: &str, options: &ExecuteOptions) -> serde_json::Value {
        json!({
            "model": options.model.clone().unwrap_or_else(|| self.model.clone()),
            "messages": [{"role": "user", "content": prompt}],
        })
    }
}

#[async_trait]
impl AgentAdapter for ApiAgent {
    async fn execute(&self, prompt: &str, options: &ExecuteOptions) -> Result<AgentResponse, CoderError> {
        let timeout_ms = options.timeout_ms.unwrap_or(self.timeout_ms);
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(prompt, options))
            .timeout(std::time::Duration::from_millis(timeout_ms));

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CoderError::Timeout(format!("API request exceeded {timeout_ms}ms"))
            } else {
                CoderError::AgentExit { code: None, message: e.to_string() }
            }
        })?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoderError::AgentExit { code: None, message: format!("invalid JSON response: {e}") })?;

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("no error message in response body")
                .to_string();
            return Err(CoderError::AgentExit { code: Some(status.as_u16() as i32), message });
        }

        let text = extract_text(&body);
        Ok(AgentResponse { text, exit_code: Some(0) })
    }

    async fn kill(&self) {
        // A single in-flight HTTP request is cancelled by dropping its
        // future; this adapter holds no handle beyond that future's
        // lifetime, so there is nothing further to release here.
    }
}

/// Pull the assistant's reply text out of a chat-completions-shaped
/// response body, falling back to the raw body text if the shape is
/// unrecognized.
fn extract_text(body: &serde_json::Value) -> String {
    body.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .or_else(|| body.get("content").and_then(|c| c.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
