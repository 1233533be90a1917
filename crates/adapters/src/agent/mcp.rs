// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nested MCP agent variant (spec §4.B): the prompt is relayed through an
//! MCP client to an externally-hosted MCP server. No MCP client crate is
//! in scope here, so this variant shells out to a small relay process
//! (the same heredoc-over-`/bin/sh` mechanism as [`super::cli::CliAgent`])
//! that speaks JSON-RPC to the server and prints the tool result on
//! stdout — the thinnest faithful rendering of "relay through a client"
//! without vendoring a full MCP implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use coder_core::CoderError;
use serde_json::json;

use crate::subprocess::{self, PgidTracker, RunOptions};

use super::shell::escape as shell_escape;
use super::{AgentAdapter, AgentResponse, ExecuteOptions};

/// Relays a prompt to a tool on an externally-hosted MCP server via a
/// local relay binary (e.g. an `mcp-client` CLI) that speaks JSON-RPC
/// over its own transport to the server.
pub struct McpAgent {
    pub relay_binary: String,
    pub server_url: String,
    pub tool_name: String,
    pub timeout_ms: Option<u64>,
    pub kill_on_stderr_patterns: Vec<String>,
    pub secrets: HashMap<String, String>,
    pgid: PgidTracker,
}

impl McpAgent {
    pub fn new(relay_binary: impl Into<String>, server_url: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            relay_binary: relay_binary.into(),
            server_url: server_url.into(),
            tool_name: tool_name.into(),
            timeout_ms: None,
            kill_on_stderr_patterns: Vec::new(),
            secrets: HashMap::new(),
            pgid: PgidTracker::new(),
        }
    }

    fn request_body(&self, prompt: &str, options: &ExecuteOptions) -> serde_json::Value {
        let mut arguments = json!({ "prompt": prompt });
        if let Some(session_id) = &options.session_id {
            arguments["sessionId"] = json!(session_id.as_str());
        }
        if let Some(resume_id) = &options.resume_id {
            arguments["resumeId"] = json!(resume_id.as_str());
        }
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": self.tool_name, "arguments": arguments },
        })
    }

    fn build_command(&self, prompt: &str, options: &ExecuteOptions) -> String {
        let sentinel = format!("CODER_MCP_{}", nanoid::nanoid!(16));
        let body = self.request_body(prompt, options).to_string();
        format!("{} <<'{sentinel}'\n{body}\n{sentinel}\n", shell_escape(&self.relay_binary))
    }

    /// Secrets overlay for this call: the server URL travels as an
    /// environment variable rather than a shell argument, the same way
    /// every other credential reaches a subprocess here.
    fn env_secrets(&self) -> HashMap<String, String> {
        let mut secrets = self.secrets.clone();
        secrets.insert("CODER_MCP_SERVER_URL".to_string(), self.server_url.clone());
        secrets
    }
}

/// Extract the tool result text from a JSON-RPC response, falling back to
/// the raw stdout if the relay didn't emit well-formed JSON-RPC.
fn extract_result_text(stdout: &str) -> String {
    serde_json::from_str::<serde_json::Value>(stdout.trim())
        .ok()
        .and_then(|value| {
            value
                .get("result")
                .and_then(|r| r.get("content"))
                .and_then(|c| c.as_array())
                .and_then(|items| items.first())
                .and_then(|item| item.get("text"))
                .and_then(|t| t.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| stdout.to_string())
}

#[async_trait]
impl AgentAdapter for McpAgent {
    async fn execute(&self, prompt: &str, options: &ExecuteOptions) -> Result<AgentResponse, CoderError> {
        let command = self.build_command(prompt, options);
        let run_options = RunOptions {
            timeout_ms: options.timeout_ms.or(self.timeout_ms),
            kill_on_stderr_patterns: self.kill_on_stderr_patterns.clone(),
            secrets: self.env_secrets(),
            ..RunOptions::new()
        };
        match subprocess::run_tracked(&command, &run_options, &self.pgid).await {
            Ok(output) => {
                Ok(AgentResponse { text: extract_result_text(&output.stdout), exit_code: output.exit_code })
            }
            Err(subprocess::SubprocessError::Timeout { reason, .. }) => Err(CoderError::Timeout(reason)),
            Err(subprocess::SubprocessError::Auth { pattern, .. }) => {
                Err(CoderError::AuthFailure(format!("stderr matched kill pattern {pattern:?}")))
            }
            Err(err) => Err(CoderError::AgentExit { code: None, message: err.to_string() }),
        }
    }

    async fn kill(&self) {
        subprocess::kill_group(self.pgid.get()).await;
    }
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
