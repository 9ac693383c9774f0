// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn startup_marker_appends_with_pid() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("state/jed.log");

    write_startup_marker(&log).unwrap();
    write_startup_error(&log, &"address in use");
    write_startup_marker(&log).unwrap();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("--- jed: starting (pid: {}) ---", std::process::id()));
    assert_eq!(lines[1], "ERROR failed to start jed: address in use");
    assert!(lines[2].starts_with(STARTUP_MARKER_PREFIX));
}
