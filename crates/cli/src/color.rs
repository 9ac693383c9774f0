// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

/// Table headers: pastel cyan / steel blue
const HEADER: u8 = 74;
/// Secondary text: darker grey
const MUTED: u8 = 240;

const RESET: &str = "\x1b[0m";

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, then the TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

pub(crate) fn apply_header(text: &str) -> String {
    format!("{}{}{}", fg256(HEADER), text, RESET)
}

pub(crate) fn apply_muted(text: &str) -> String {
    format!("{}{}{}", fg256(MUTED), text, RESET)
}

/// Color a job state: green while active, yellow while pending, red when
/// it ended badly. STOPPED stays plain.
pub(crate) fn apply_state(text: &str) -> String {
    let code = match text.trim().to_ascii_uppercase().as_str() {
        "RUNNING" => "\x1b[32m",
        "CREATED" | "WAITING" => "\x1b[33m",
        "KILLED" | "ERRORED" => "\x1b[31m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
