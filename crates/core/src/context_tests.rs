// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn starts_neither_cancelled_nor_paused() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
    assert!(!token.is_paused());
}

#[test]
fn cancel_is_visible_through_clones() {
    let token = CancelToken::new();
    let clone = token.clone();
    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn pause_then_resume_clears_the_flag() {
    let token = CancelToken::new();
    token.pause();
    assert!(token.is_paused());
    token.resume();
    assert!(!token.is_paused());
}

#[test]
fn cancel_and_pause_are_independent() {
    let token = CancelToken::new();
    token.pause();
    token.cancel();
    assert!(token.is_paused());
    assert!(token.is_cancelled());
}
