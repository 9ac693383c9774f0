// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[parameterized(
    none = { &[], &[], false, false },
    repeated = { &[("arg", "-n"), ("arg", "hello world")], &["-n", "hello world"], false, false },
    space_split = { &[("args", "a  b c")], &["a", "b", "c"], false, false },
    flags = { &[("interactive", "1"), ("wait", "yes")], &[], true, true },
    empty_flag = { &[("wait", "")], &[], false, false },
    ignores_unknown = { &[("color", "red"), ("arg", "x")], &["x"], false, false },
)]
fn create_params(query: &[(&str, &str)], args: &[&str], interactive: bool, wait: bool) {
    let params = CreateParams::from_query(pairs(query));
    assert_eq!(
        params,
        CreateParams {
            args: args.iter().map(|a| a.to_string()).collect(),
            interactive,
            wait,
        }
    );
}

#[test]
fn parses_id_lists() {
    assert_eq!(parse_ids("3, 1,,2").unwrap(), vec![JobId(3), JobId(1), JobId(2)]);
    assert!(matches!(parse_ids("1,x"), Err(ApiError::BadRequest(_))));
}
