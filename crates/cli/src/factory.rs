// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the one real [`AgentFactory`] the binary needs from
//! `workflow.agentRoles` + `models`: which concrete backend a role maps
//! to is config, not code.
//!
//! `coder-core::config::ModelConfig` has no explicit "kind" field, so
//! this binary picks the backend by inspecting what's set on the entry
//! the role's backend name resolves to (see DESIGN.md for the exact
//! convention): an `apiEndpoint` selects [`ApiAgent`]; a backend name
//! prefixed `mcp:` selects [`McpAgent`]; anything else is a [`CliAgent`]
//! whose binary is the model name (or the backend name itself).

use std::collections::HashMap;
use std::sync::Arc;

use coder_adapters::agent::{AgentAdapter, ApiAgent, CliAgent, McpAgent};
use coder_adapters::AgentFactory;
use coder_core::config::ModelConfig;
use coder_core::{AgentRole, AgentScope};

use crate::exit_error::ExitError;

pub struct ConfiguredAgentFactory {
    /// Role -> backend name, from `workflow.agentRoles`.
    role_backends: HashMap<AgentRole, String>,
    /// Backend name -> its model/endpoint parameters, from `models`.
    models: HashMap<String, ModelConfig>,
}

impl ConfiguredAgentFactory {
    pub fn new(role_backends: HashMap<AgentRole, String>, models: HashMap<String, ModelConfig>) -> Self {
        Self { role_backends, models }
    }

    /// Validates that every configured role resolves to a known backend,
    /// so a typo in `workflow.agentRoles` surfaces as exit code 2 before
    /// any agent is ever invoked, instead of an `unreachable!` mid-run.
    pub fn validate(&self) -> Result<(), ExitError> {
        for (role, backend) in &self.role_backends {
            if !self.models.contains_key(backend) {
                return Err(ExitError::invalid_config(format!(
                    "workflow.agentRoles.{role} points at unconfigured backend \"{backend}\""
                )));
            }
        }
        Ok(())
    }

    fn backend_for(&self, role: AgentRole) -> Option<(&str, &ModelConfig)> {
        let name = self.role_backends.get(&role)?;
        self.models.get(name).map(|cfg| (name.as_str(), cfg))
    }
}

impl AgentFactory for ConfiguredAgentFactory {
    fn build(&self, role: AgentRole, _scope: AgentScope) -> (String, Arc<dyn AgentAdapter>) {
        let Some((name, cfg)) = self.backend_for(role) else {
            // `validate()` is expected to have run first; falling back to
            // a bare CLI agent named after the role keeps this callable
            // without panicking if a caller skips that step.
            return (role.to_string(), Arc::new(CliAgent::new(role.to_string())));
        };

        if let Some(endpoint) = &cfg.api_endpoint {
            let api_key = cfg
                .api_key_env
                .as_ref()
                .and_then(|var| std::env::var(var).ok())
                .unwrap_or_default();
            let model = cfg.model.clone().unwrap_or_else(|| name.to_string());
            return (name.to_string(), Arc::new(ApiAgent::new(endpoint.clone(), api_key, model)));
        }

        if let Some(relay_binary) = name.strip_prefix("mcp:") {
            let server_url = cfg.model.clone().unwrap_or_default();
            return (name.to_string(), Arc::new(McpAgent::new(relay_binary.to_string(), server_url, role.to_string())));
        }

        let binary = cfg.model.clone().unwrap_or_else(|| name.to_string());
        (name.to_string(), Arc::new(CliAgent::new(binary)))
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
