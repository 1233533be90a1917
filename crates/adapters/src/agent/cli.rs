// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI agent variant (spec §4.B): feeds the prompt through a heredoc with
//! a randomized sentinel so the prompt body can never prematurely close
//! the shell's here-document, and shell-escapes model/session/resume
//! flags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coder_core::CoderError;
use parking_lot::Mutex;

use crate::subprocess::{self, PgidTracker, RunOptions};

use super::shell::escape as shell_escape;
use super::{AgentAdapter, AgentResponse, ExecuteOptions};

/// Drives a locally installed CLI coding assistant as a subprocess.
pub struct CliAgent {
    pub binary: String,
    pub timeout_ms: Option<u64>,
    pub hang_timeout_ms: Option<u64>,
    pub kill_on_stderr_patterns: Vec<String>,
    pub secrets: HashMap<String, String>,
    /// Mutable so a repo-scoped instance already cached in the pool can
    /// be repointed at a new working directory without losing the cache.
    cwd: Mutex<Option<PathBuf>>,
    pgid: PgidTracker,
}

impl CliAgent {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout_ms: None,
            hang_timeout_ms: None,
            kill_on_stderr_patterns: Vec::new(),
            secrets: HashMap::new(),
            cwd: Mutex::new(None),
            pgid: PgidTracker::new(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Mutex::new(Some(cwd.into()));
        self
    }

    pub fn cwd(&self) -> Option<PathBuf> {
        self.cwd.lock().clone()
    }

    fn build_command(&self, prompt: &str, options: &ExecuteOptions) -> String {
        let sentinel = format!("CODER_PROMPT_{}", nanoid::nanoid!(16));

        let mut invocation = vec![shell_escape(&self.binary)];
        if let Some(model) = &options.model {
            invocation.push("--model".to_string());
            invocation.push(shell_escape(model));
        }
        if let Some(session_id) = &options.session_id {
            invocation.push("--session".to_string());
            invocation.push(shell_escape(session_id.as_str()));
        }
        if let Some(resume_id) = &options.resume_id {
            invocation.push("--resume".to_string());
            invocation.push(shell_escape(resume_id.as_str()));
        }
        invocation.push(format!("<<'{sentinel}'"));

        let mut command = String::new();
        if let Some(cwd) = self.cwd.lock().as_ref() {
            command.push_str("cd ");
            command.push_str(&shell_escape(&cwd.to_string_lossy()));
            command.push_str(" && ");
        }
        command.push_str(&invocation.join(" "));
        command.push('\n');
        command.push_str(prompt);
        command.push('\n');
        command.push_str(&sentinel);
        command.push('\n');
        command
    }

    fn run_options(&self, options: &ExecuteOptions) -> RunOptions {
        RunOptions {
            timeout_ms: options.timeout_ms.or(self.timeout_ms),
            hang_timeout_ms: self.hang_timeout_ms,
            kill_on_stderr_patterns: self.kill_on_stderr_patterns.clone(),
            secrets: self.secrets.clone(),
            ..RunOptions::new()
        }
    }
}

#[async_trait]
impl AgentAdapter for CliAgent {
    async fn execute(&self, prompt: &str, options: &ExecuteOptions) -> Result<AgentResponse, CoderError> {
        let command = self.build_command(prompt, options);
        let run_options = self.run_options(options);
        match subprocess::run_tracked(&command, &run_options, &self.pgid).await {
            Ok(output) => Ok(AgentResponse { text: output.stdout, exit_code: output.exit_code }),
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

    fn set_cwd(&self, path: &Path) {
        *self.cwd.lock() = Some(path.to_path_buf());
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
