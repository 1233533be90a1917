// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use coder_core::issue::IssueBuilder;

use super::*;

fn issue(id: &str, deps: &[&str], difficulty: Option<u8>) -> Issue {
    let mut builder = IssueBuilder::default().id(id).depends_on(deps.iter().map(|d| d.to_string()).collect());
    if let Some(d) = difficulty {
        builder = builder.difficulty(d);
    }
    builder.build()
}

#[test]
fn orders_a_simple_chain_by_dependency() {
    let issues = vec![issue("c", &["b"], None), issue("a", &[], None), issue("b", &["a"], None)];

    let result = build_queue(issues);

    let ids: Vec<&str> = result.issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(result.cycle_ids.is_empty());
}

#[test]
fn sorts_independent_issues_by_ascending_difficulty() {
    let issues = vec![issue("hard", &[], Some(5)), issue("easy", &[], Some(1)), issue("mid", &[], Some(3))];

    let result = build_queue(issues);

    let ids: Vec<&str> = result.issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["easy", "mid", "hard"]);
}

#[test]
fn ignores_dependency_edges_pointing_outside_the_set() {
    let issues = vec![issue("a", &["ghost"], None)];

    let result = build_queue(issues);

    assert_eq!(result.issues.len(), 1);
    assert!(result.cycle_ids.is_empty());
}

#[test]
fn detects_a_cycle_without_dropping_either_node() {
    let issues = vec![issue("a", &["b"], None), issue("b", &["a"], None)];

    let result = build_queue(issues);

    assert_eq!(result.issues.len(), 2);
    let mut cycle = result.cycle_ids.clone();
    cycle.sort_unstable();
    assert_eq!(cycle, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn diamond_dependency_resolves_all_four_nodes_in_a_valid_order() {
    let issues = vec![
        issue("d", &["b", "c"], None),
        issue("b", &["a"], None),
        issue("c", &["a"], None),
        issue("a", &[], None),
    ];

    let result = build_queue(issues);

    let ids: Vec<&str> = result.issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids[0], "a");
    assert_eq!(ids[3], "d");
    assert!(result.cycle_ids.is_empty());
}
