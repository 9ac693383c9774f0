// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Resolve state directory: JE_STATE_DIR > XDG_STATE_HOME/je > ~/.local/state/je
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("JE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("je"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/je"))
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Search index flush interval override
pub fn index_interval() -> Option<Duration> {
    millis("JE_INDEX_INTERVAL_MS")
}

/// Log store compaction check interval override
pub fn compact_interval() -> Option<Duration> {
    millis("JE_COMPACT_INTERVAL_MS")
}

/// Data tail poll interval override
pub fn tail_poll() -> Option<Duration> {
    millis("JE_TAIL_POLL_MS")
}
