// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The global machine registry (spec §4.D): machines are registered once
//! by dotted name and looked up by the workflow runner. A plain
//! `HashMap` built at construction time, matching the teacher's
//! preference for an explicit runtime table over build-time codegen
//! (no `phf`/derive-macro registry in this stack).

use std::collections::HashMap;
use std::sync::Arc;

use crate::machine::Machine;

/// `"develop.planning" -> Arc<dyn Machine>`, populated once and shared
/// read-only for the rest of the process's life.
#[derive(Default)]
pub struct Registry {
    machines: HashMap<&'static str, Arc<dyn Machine>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a machine under its own `name()`. Overwrites any prior
    /// registration under the same name — callers building a registry
    /// from scratch control ordering, so last-registration-wins is never
    /// surprising in practice.
    pub fn register(&mut self, machine: Arc<dyn Machine>) -> &mut Self {
        self.machines.insert(machine.name(), machine);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Machine>> {
        self.machines.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.machines.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
