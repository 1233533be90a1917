// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role/scope-keyed agent cache (spec §4.C), matching the teacher's
//! session/agent caching style: a `HashMap` behind a `parking_lot::Mutex`,
//! entries constructed lazily on first request and reused thereafter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use coder_core::{AgentRole, AgentScope};
use parking_lot::Mutex;

use super::AgentAdapter;

/// Constructs the concrete adapter bound to a role, given the backend
/// name configuration resolved that role to. Supplied by the caller
/// (typically the engine, which knows `workflow.agentRoles` and
/// `models.*`) so this crate stays free of config-parsing concerns.
pub trait AgentFactory: Send + Sync {
    fn build(&self, role: AgentRole, scope: AgentScope) -> (String, Arc<dyn AgentAdapter>);
}

impl<F> AgentFactory for F
where
    F: Fn(AgentRole, AgentScope) -> (String, Arc<dyn AgentAdapter>) + Send + Sync,
{
    fn build(&self, role: AgentRole, scope: AgentScope) -> (String, Arc<dyn AgentAdapter>) {
        self(role, scope)
    }
}

struct PoolEntry {
    agent_name: String,
    agent: Arc<dyn AgentAdapter>,
}

/// `{role, scope} -> agent` cache. Repo-scoped entries are repointed via
/// [`AgentPool::set_repo_root`] rather than rebuilt when only the
/// checked-out path changes.
pub struct AgentPool {
    factory: Box<dyn AgentFactory>,
    entries: Mutex<HashMap<(AgentRole, AgentScope), PoolEntry>>,
    repo_root: Mutex<Option<PathBuf>>,
}

impl AgentPool {
    pub fn new(factory: impl AgentFactory + 'static) -> Self {
        Self { factory: Box::new(factory), entries: Mutex::new(HashMap::new()), repo_root: Mutex::new(None) }
    }

    /// Return the cached agent for `(role, scope)`, constructing it via
    /// the factory on first request.
    pub fn get_agent(&self, role: AgentRole, scope: AgentScope) -> (String, Arc<dyn AgentAdapter>) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&(role, scope)) {
            return (entry.agent_name.clone(), entry.agent.clone());
        }
        let (agent_name, agent) = self.factory.build(role, scope);
        if scope == AgentScope::Repo {
            if let Some(root) = self.repo_root.lock().as_deref() {
                agent.set_cwd(root);
            }
        }
        entries.insert((role, scope), PoolEntry { agent_name: agent_name.clone(), agent: agent.clone() });
        (agent_name, agent)
    }

    /// Repoint every cached repo-scoped agent at `path`. A no-op if
    /// `path` is unchanged from the current repo root, so the cache
    /// survives repeated calls with the same value.
    pub fn set_repo_root(&self, path: &Path) {
        let mut repo_root = self.repo_root.lock();
        if repo_root.as_deref() == Some(path) {
            return;
        }
        *repo_root = Some(path.to_path_buf());
        drop(repo_root);

        let entries = self.entries.lock();
        for ((_, scope), entry) in entries.iter() {
            if *scope == AgentScope::Repo {
                entry.agent.set_cwd(path);
            }
        }
    }

    /// Terminate every cached agent's in-flight subprocess/connection.
    /// Idempotent: killing an adapter with nothing running is a no-op.
    pub async fn kill_all(&self) {
        let agents: Vec<Arc<dyn AgentAdapter>> = {
            let entries = self.entries.lock();
            entries.values().map(|e| e.agent.clone()).collect()
        };
        for agent in agents {
            agent.kill().await;
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
