// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    absent = { None, false },
    empty = { Some(""), false },
    one = { Some("1"), true },
    word = { Some("yes"), true },
)]
fn flags(value: Option<&str>, expected: bool) {
    assert_eq!(flag(&value.map(str::to_string)), expected);
}

#[parameterized(
    zero = { "0" },
    negative = { "-3" },
    word = { "seven" },
)]
fn rejects_bad_ids(raw: &str) {
    assert!(matches!(parse_id(raw), Err(ApiError::BadRequest(_))));
}

#[test]
fn version_names_the_engine() {
    assert!(version_string().starts_with("Job Engine "));
}
