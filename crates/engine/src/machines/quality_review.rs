// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `develop.quality_review`: the thin registry-facing wrapper around the
//! four-phase loop in [`crate::review`]. Precondition/idempotence live
//! here; the phase machinery lives in `review` since it is reused by
//! nothing else in the registry.

use async_trait::async_trait;
use coder_core::CoderError;
use serde_json::{json, Value};

use crate::machine::{Machine, MachineContext, MachineOutcome};
use crate::machines::support::{load_state, save_state};

pub struct QualityReviewMachine;

#[async_trait]
impl Machine for QualityReviewMachine {
    fn name(&self) -> &'static str {
        "develop.quality_review"
    }

    async fn execute(&self, _input: Value, ctx: &MachineContext) -> MachineOutcome {
        let mut state = match load_state(ctx) {
            Ok(s) => s,
            Err(e) => return MachineOutcome::error(e.to_string()),
        };

        if !state.steps.implemented {
            return MachineOutcome::error(CoderError::PreconditionFailed("implementation has not run".to_string()).to_string());
        }
        if state.steps.tests_passed && state.steps.ppcommit_clean && state.review_fingerprint.is_some() {
            return MachineOutcome::ok(json!({ "cached": true }));
        }

        let outcome = match crate::review::run(ctx, &mut state).await {
            Ok(o) => o,
            Err(e) => {
                if let Err(save_err) = save_state(ctx, &state) {
                    tracing::warn!(error = %save_err, "failed to persist partial quality-review progress");
                }
                return MachineOutcome::error(e.to_string());
            }
        };

        if let Err(e) = save_state(ctx, &state) {
            return MachineOutcome::error(e.to_string());
        }

        MachineOutcome::ok(json!({
            "ppcommitClean": outcome.ppcommit_clean,
            "testsPassed": outcome.tests_passed,
            "fingerprint": outcome.fingerprint.as_str(),
        }))
    }
}

#[cfg(test)]
#[path = "quality_review_tests.rs"]
mod tests;
