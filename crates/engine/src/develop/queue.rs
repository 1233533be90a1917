// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topological queue construction (spec §4.H step 2): order issues by
//! their `dependsOn` edges, ignoring edges that point outside the
//! discovered set. Cycles are reported, never fatal — every issue still
//! makes it into the output.

use std::collections::{HashMap, HashSet, VecDeque};

use coder_core::Issue;

/// Result of ordering a freshly-discovered issue set.
pub struct OrderedQueue {
    pub issues: Vec<Issue>,
    /// Ids that sit on at least one dependency cycle within the set.
    pub cycle_ids: Vec<String>,
}

/// Kahn's algorithm over `dependsOn`, breaking ties (and ordering the
/// no-dependency case) by ascending difficulty; issues with no recorded
/// difficulty sort last among their ready-set peers.
pub fn build_queue(issues: Vec<Issue>) -> OrderedQueue {
    let ids: HashSet<&str> = issues.iter().map(|i| i.id.as_str()).collect();
    let mut indegree: HashMap<String, usize> = HashMap::new();
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

    for issue in &issues {
        let internal_deps = issue.depends_on.iter().filter(|d| ids.contains(d.as_str())).count();
        indegree.insert(issue.id.clone(), internal_deps);
        for dep in &issue.depends_on {
            if ids.contains(dep.as_str()) {
                dependents.entry(dep.clone()).or_default().push(issue.id.clone());
            }
        }
    }

    let by_id: HashMap<String, Issue> = issues.into_iter().map(|i| (i.id.clone(), i)).collect();
    let mut ready: VecDeque<String> =
        indegree.iter().filter(|(_, &deg)| deg == 0).map(|(id, _)| id.clone()).collect();
    sort_by_difficulty(&mut ready, &by_id);

    let mut ordered = Vec::with_capacity(by_id.len());
    let mut remaining_indegree = indegree.clone();
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(id) = ready.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }
        if let Some(issue) = by_id.get(&id) {
            ordered.push(issue.clone());
        }
        if let Some(next_ids) = dependents.get(&id) {
            let mut newly_ready = Vec::new();
            for next in next_ids {
                if let Some(deg) = remaining_indegree.get_mut(next) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 && !visited.contains(next) {
                        newly_ready.push(next.clone());
                    }
                }
            }
            let mut newly_ready: VecDeque<String> = newly_ready.into();
            sort_by_difficulty(&mut newly_ready, &by_id);
            for n in newly_ready {
                ready.push_back(n);
            }
        }
    }

    // Anything left unvisited sits on a cycle (or depends, transitively,
    // on one). Spec: "include all nodes in the output regardless".
    let mut cycle_ids: Vec<String> = by_id.keys().filter(|id| !visited.contains(*id)).cloned().collect();
    cycle_ids.sort_unstable();
    for id in &cycle_ids {
        if let Some(issue) = by_id.get(id) {
            ordered.push(issue.clone());
        }
    }

    OrderedQueue { issues: ordered, cycle_ids }
}

fn sort_by_difficulty(ids: &mut VecDeque<String>, by_id: &HashMap<String, Issue>) {
    let mut v: Vec<String> = ids.drain(..).collect();
    v.sort_by_key(|id| by_id.get(id).and_then(|i| i.difficulty).unwrap_or(u8::MAX));
    ids.extend(v);
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
