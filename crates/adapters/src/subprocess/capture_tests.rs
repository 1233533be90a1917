// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn push_under_cap_keeps_everything() {
    let mut s = CapturedStream::new(10);
    s.push(b"hello");
    assert_eq!(s.as_str(), "hello");
}

#[test]
fn push_over_cap_discards_head() {
    let mut s = CapturedStream::new(5);
    s.push(b"abcde");
    s.push(b"fgh");
    assert_eq!(s.as_str(), "defgh");
}

#[test]
fn single_chunk_larger_than_cap_keeps_tail() {
    let mut s = CapturedStream::new(3);
    s.push(b"abcdefgh");
    assert_eq!(s.as_str(), "fgh");
}
