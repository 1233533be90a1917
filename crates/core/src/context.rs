// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cancel/pause flag pair shared between the workflow runner and
//! every machine it invokes. Cheap to clone; every clone shares the same
//! underlying atomics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// `{cancelled, paused}` as specified for `RunnerContext`. Checked
/// between machines (cancel) and polled during a paused wait (resume).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
