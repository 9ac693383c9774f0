// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    running = { "RUNNING", "\x1b[32mRUNNING\x1b[0m" },
    waiting = { "WAITING", "\x1b[33mWAITING\x1b[0m" },
    killed = { "KILLED", "\x1b[31mKILLED\x1b[0m" },
    errored_padded = { "ERRORED  ", "\x1b[31mERRORED  \x1b[0m" },
    stopped = { "STOPPED", "STOPPED" },
)]
fn state_colors(text: &str, expected: &str) {
    assert_eq!(apply_state(text), expected);
}

#[test]
fn header_uses_256_color() {
    assert_eq!(apply_header("ID"), "\x1b[38;5;74mID\x1b[0m");
}
