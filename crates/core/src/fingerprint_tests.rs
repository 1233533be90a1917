// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn identical_inputs_hash_identically() {
    let a = WorktreeFingerprint::compute("idx", "tracked", "staged", &[]);
    let b = WorktreeFingerprint::compute("idx", "tracked", "staged", &[]);
    assert_eq!(a, b);
}

#[test]
fn differing_staged_diff_changes_the_hash() {
    let a = WorktreeFingerprint::compute("idx", "tracked", "staged-a", &[]);
    let b = WorktreeFingerprint::compute("idx", "tracked", "staged-b", &[]);
    assert_ne!(a, b);
}

#[test]
fn untracked_file_order_does_not_affect_the_hash() {
    let a = WorktreeFingerprint::compute(
        "idx",
        "t",
        "s",
        &[("b.txt".into(), "2".into()), ("a.txt".into(), "1".into())],
    );
    let b = WorktreeFingerprint::compute(
        "idx",
        "t",
        "s",
        &[("a.txt".into(), "1".into()), ("b.txt".into(), "2".into())],
    );
    assert_eq!(a, b);
}

#[test]
fn untracked_file_contents_affect_the_hash() {
    let a = WorktreeFingerprint::compute("idx", "t", "s", &[("a.txt".into(), "1".into())]);
    let b = WorktreeFingerprint::compute("idx", "t", "s", &[("a.txt".into(), "2".into())]);
    assert_ne!(a, b);
}

#[test]
fn fingerprint_is_a_64_char_hex_digest() {
    let fp = WorktreeFingerprint::compute("idx", "t", "s", &[]);
    assert_eq!(fp.as_str().len(), 64);
    assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
}
