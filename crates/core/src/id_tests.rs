// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

// --- define_id! macro tests ---

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_new_and_display() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
}

#[test]
fn define_id_generate_is_unique() {
    let a = TestId::generate();
    let b = TestId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 32);
}

#[test]
fn define_id_short_truncates() {
    let id = TestId::new("abcdefgh");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefgh");
}

#[test]
fn define_id_borrow_enables_str_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("key"), 1);
    assert_eq!(map.get("key"), Some(&1));
    let id = TestId::new("key");
    let s: &str = id.borrow();
    assert_eq!(s, "key");
}

#[test]
fn define_id_serializes_as_plain_string() {
    let id = TestId::new("w-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"w-1\"");
}

// --- JobId ---

#[yare::parameterized(
    one     = { 1, [0, 0, 0, 0, 0, 0, 0, 1] },
    byte    = { 255, [0, 0, 0, 0, 0, 0, 0, 255] },
    carry   = { 256, [0, 0, 0, 0, 0, 0, 1, 0] },
    largest = { u64::MAX, [255; 8] },
)]
fn job_id_key_is_big_endian(id: u64, expected: [u8; 8]) {
    assert_eq!(JobId(id).to_key(), expected);
    assert_eq!(JobId::from_key(&expected), Some(JobId(id)));
}

#[test]
fn job_id_key_order_matches_numeric_order() {
    let mut keys: Vec<[u8; 8]> = [300u64, 2, 70_000, 1].iter().map(|&n| JobId(n).to_key()).collect();
    keys.sort();
    let ids: Vec<u64> = keys.iter().filter_map(|k| JobId::from_key(k)).map(JobId::get).collect();
    assert_eq!(ids, vec![1, 2, 300, 70_000]);
}

#[test]
fn job_id_from_key_rejects_wrong_width() {
    assert_eq!(JobId::from_key(&[1, 2, 3]), None);
    assert_eq!(JobId::from_key(&[0; 9]), None);
}

#[yare::parameterized(
    simple     = { "42", Some(42) },
    padded     = { " 7 ", Some(7) },
    zero       = { "0", None },
    negative   = { "-1", None },
    not_number = { "abc", None },
    empty      = { "", None },
)]
fn job_id_parse(input: &str, expected: Option<u64>) {
    assert_eq!(input.parse::<JobId>().ok().map(JobId::get), expected);
}

#[test]
fn job_id_serializes_as_number() {
    assert_eq!(serde_json::to_string(&JobId(9)).unwrap(), "9");
    let id: JobId = serde_json::from_str("12").unwrap();
    assert_eq!(id, JobId(12));
    assert!(JobId::default().is_unassigned());
}
