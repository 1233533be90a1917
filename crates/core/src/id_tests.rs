// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

crate::define_id! {
    pub struct TestId("tst-");
}

#[test]
fn new_ids_carry_the_prefix_and_fit_idbuf() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn new_ids_are_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.as_str(), "tst-abc123");
    assert_eq!(id.to_string(), "tst-abc123");
}

#[test]
fn suffix_strips_prefix() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn suffix_falls_back_to_full_string_without_prefix() {
    let id = TestId::from_string("no-prefix-here");
    assert_eq!(id.suffix(), "no-prefix-here");
}

#[test]
fn short_truncates_the_suffix() {
    let id = TestId::from_string("tst-abcdefgh");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_is_noop_when_n_exceeds_suffix_len() {
    let id = TestId::from_string("tst-ab");
    assert_eq!(id.short(10), "ab");
}

#[test]
fn is_empty_reflects_the_underlying_buffer() {
    assert!(TestId::from_string("").is_empty());
    assert!(!TestId::new().is_empty());
}

#[test]
fn default_generates_a_fresh_id() {
    assert!(!TestId::default().is_empty());
}

#[test]
fn equality_against_str_and_borrowed_str() {
    let id = TestId::from_string("tst-xyz");
    assert_eq!(id, "tst-xyz");
    assert_eq!(id, *"tst-xyz".to_string().as_str());
}

#[test]
fn deref_exposes_str_methods() {
    let id = TestId::from_string("tst-abc");
    assert!(id.ends_with("abc"));
}

#[test]
fn serializes_as_a_plain_string() {
    let id = TestId::from_string("tst-abc");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"tst-abc\"");
}

#[test]
fn deserializes_from_a_plain_string() {
    let id: TestId = serde_json::from_str("\"tst-abc\"").unwrap();
    assert_eq!(id.as_str(), "tst-abc");
}

#[test]
fn short_fn_truncates_arbitrary_strings() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}

#[test]
fn id_as_hash_map_key_is_found_by_borrowed_str() {
    use std::collections::HashMap;
    let id = TestId::new();
    let mut map: HashMap<TestId, u32> = HashMap::new();
    map.insert(id, 7);
    assert_eq!(map.get(id.as_str()), Some(&7));
}

#[test]
fn idbuf_borrow_as_str_matches_hash() {
    use std::collections::HashSet;
    let mut set: HashSet<IdBuf> = HashSet::new();
    set.insert(IdBuf::new("tst-abc"));
    assert!(set.contains("tst-abc"));
}
