// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log file setup for `jed`.

use std::io::Write;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Full format: "--- jed: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- jed: starting (pid: ";

/// Append the startup marker, creating the log directory if needed.
pub fn write_startup_marker(log_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())
}

/// Write a startup failure synchronously; the non-blocking writer may not
/// flush before the process exits.
pub fn write_startup_error(log_path: &Path, error: &dyn std::fmt::Display) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start jed: {error}");
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `log_path`. Keep the guard
/// alive for the life of the process.
pub fn setup_file_logging(log_path: &Path) -> std::io::Result<WorkerGuard> {
    let invalid = || std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name");
    let dir = log_path.parent().ok_or_else(invalid)?;
    let file = log_path.file_name().ok_or_else(invalid)?;
    std::fs::create_dir_all(dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    Ok(guard)
}

pub fn setup_stderr_logging() {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
