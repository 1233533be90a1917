// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use coder_core::CoderError;
use parking_lot::Mutex;

use super::*;
use crate::agent::{AgentResponse, ExecuteOptions};

#[derive(Default)]
struct CountingAgent {
    killed: AtomicU32,
    cwd: Mutex<Option<PathBuf>>,
}

#[async_trait]
impl AgentAdapter for CountingAgent {
    async fn execute(&self, _prompt: &str, _options: &ExecuteOptions) -> Result<AgentResponse, CoderError> {
        Ok(AgentResponse { text: String::new(), exit_code: Some(0) })
    }

    async fn kill(&self) {
        self.killed.fetch_add(1, Ordering::SeqCst);
    }

    fn set_cwd(&self, path: &Path) {
        *self.cwd.lock() = Some(path.to_path_buf());
    }
}

/// A pool whose factory records each concrete `CountingAgent` it builds,
/// in construction order, so tests can inspect internal state the
/// `Arc<dyn AgentAdapter>` handle alone doesn't expose.
struct RecordingFactory {
    calls: AtomicU32,
    built: Mutex<Vec<Arc<CountingAgent>>>,
}

impl AgentFactory for Arc<RecordingFactory> {
    fn build(&self, _role: AgentRole, _scope: AgentScope) -> (String, Arc<dyn AgentAdapter>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let agent = Arc::new(CountingAgent::default());
        self.built.lock().push(agent.clone());
        ("fake-backend".to_string(), agent)
    }
}

fn recording_pool() -> (AgentPool, Arc<RecordingFactory>) {
    let factory = Arc::new(RecordingFactory { calls: AtomicU32::new(0), built: Mutex::new(Vec::new()) });
    (AgentPool::new(factory.clone()), factory)
}

#[test]
fn get_agent_constructs_lazily_and_caches_on_repeat_calls() {
    let (pool, factory) = recording_pool();

    let (name_a, agent_a) = pool.get_agent(AgentRole::Planner, AgentScope::Workspace);
    let (name_b, agent_b) = pool.get_agent(AgentRole::Planner, AgentScope::Workspace);

    assert_eq!(factory.calls.load(Ordering::SeqCst), 1, "second call must hit the cache, not the factory");
    assert_eq!(name_a, "fake-backend");
    assert_eq!(name_b, "fake-backend");
    assert!(Arc::ptr_eq(&agent_a, &agent_b));
}

#[test]
fn distinct_role_scope_pairs_get_distinct_cache_entries() {
    let (pool, factory) = recording_pool();

    pool.get_agent(AgentRole::Planner, AgentScope::Workspace);
    pool.get_agent(AgentRole::Reviewer, AgentScope::Workspace);
    pool.get_agent(AgentRole::Planner, AgentScope::Repo);

    assert_eq!(factory.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn set_repo_root_repoints_cached_repo_scoped_agents() {
    let (pool, factory) = recording_pool();
    pool.get_agent(AgentRole::Programmer, AgentScope::Repo);

    pool.set_repo_root(Path::new("/repo/a"));

    let built = factory.built.lock();
    assert_eq!(*built[0].cwd.lock(), Some(PathBuf::from("/repo/a")));
}

#[test]
fn set_repo_root_does_not_touch_workspace_scoped_agents() {
    let (pool, factory) = recording_pool();
    pool.get_agent(AgentRole::IssueSelector, AgentScope::Workspace);

    pool.set_repo_root(Path::new("/repo/a"));

    let built = factory.built.lock();
    assert_eq!(*built[0].cwd.lock(), None);
}

#[test]
fn set_repo_root_is_a_no_op_when_the_path_is_unchanged() {
    let (pool, factory) = recording_pool();
    pool.get_agent(AgentRole::Programmer, AgentScope::Repo);

    pool.set_repo_root(Path::new("/repo/a"));
    {
        let built = factory.built.lock();
        *built[0].cwd.lock() = Some(PathBuf::from("/overridden/by/test"));
    }
    pool.set_repo_root(Path::new("/repo/a"));

    let built = factory.built.lock();
    assert_eq!(*built[0].cwd.lock(), Some(PathBuf::from("/overridden/by/test")));
}

#[tokio::test]
async fn kill_all_reaches_every_cached_agent_exactly_once_per_call() {
    let (pool, factory) = recording_pool();
    pool.get_agent(AgentRole::Planner, AgentScope::Workspace);
    pool.get_agent(AgentRole::Reviewer, AgentScope::Repo);

    pool.kill_all().await;
    pool.kill_all().await;

    let built = factory.built.lock();
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].killed.load(Ordering::SeqCst), 2);
    assert_eq!(built[1].killed.load(Ordering::SeqCst), 2);
}
