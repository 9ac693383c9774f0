// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod job;
pub mod run;
pub mod stream;

use std::path::Path;

use anyhow::{Context, Result};
use je_core::{Job, JobState};
use reqwest::Body;
use tokio_util::io::ReaderStream;

/// Process exit code for a finished job. Killed, errored and
/// signal-terminated jobs map to 1.
pub(crate) fn exit_code(job: &Job) -> i32 {
    match job.state {
        JobState::Stopped if job.status >= 0 => job.status,
        _ => 1,
    }
}

/// Streaming request body read from `path`.
pub(crate) async fn file_body(path: &Path) -> Result<Body> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Body::wrap_stream(ReaderStream::new(file)))
}

/// Streaming request body read from this process's stdin.
pub(crate) fn stdin_body() -> Body {
    Body::wrap_stream(ReaderStream::new(tokio::io::stdin()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
