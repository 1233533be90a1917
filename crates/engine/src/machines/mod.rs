// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete develop-pipeline machines (spec §4.D): each carries its I/O
//! contract, input validation, and step-flag idempotence; the prompt and
//! domain content behind the agent calls is out of scope, so each body
//! is a thin, clearly-labeled seam onto the agent pool or a shell
//! command.

pub mod implementation;
pub mod issue_draft;
pub mod issue_list;
pub mod plan_review;
pub mod planning;
pub mod pr_creation;
pub mod quality_review;
pub(crate) mod support;

use std::sync::Arc;

use crate::registry::Registry;

/// Register every concrete machine under its dotted name. Called once
/// at startup by whatever wires `coder-engine` into a binary.
pub fn register_all(registry: &mut Registry) {
    registry.register(Arc::new(issue_list::IssueListMachine));
    registry.register(Arc::new(issue_draft::IssueDraftMachine));
    registry.register(Arc::new(planning::PlanningMachine));
    registry.register(Arc::new(plan_review::PlanReviewMachine));
    registry.register(Arc::new(implementation::ImplementationMachine));
    registry.register(Arc::new(quality_review::QualityReviewMachine));
    registry.register(Arc::new(pr_creation::PrCreationMachine));
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
