// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use je_core::Job;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Short human-readable duration: `"5s"`, `"2m"`, `"1h30m"`, `"3d"`.
/// Negative durations clamp to zero.
pub fn format_duration(d: chrono::Duration) -> String {
    let secs = d.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let (h, m) = (secs / 3600, (secs % 3600) / 60);
        if m > 0 {
            format!("{h}h{m}m")
        } else {
            format!("{h}h")
        }
    } else {
        format!("{}d", secs / 86400)
    }
}

pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_duration(now - at)
}

/// `"-"` for jobs that never started.
pub fn format_elapsed(job: &Job, now: DateTime<Utc>) -> String {
    job.elapsed(now).map_or_else(|| "-".to_string(), format_duration)
}

/// Key/value detail lines for `je show`.
pub fn job_details(job: &Job, now: DateTime<Utc>, colorize: bool) -> Vec<String> {
    let state = if colorize {
        color::apply_state(job.state.as_str())
    } else {
        job.state.to_string()
    };
    let mut command = job.name.clone();
    for arg in &job.args {
        command.push(' ');
        command.push_str(arg);
    }

    let mut lines = vec![
        format!("ID:          {}", job.id),
        format!("Command:     {command}"),
        format!("State:       {state}"),
    ];
    if job.is_terminal() {
        lines.push(format!("Status:      {}", job.status));
    }
    if job.interactive {
        lines.push("Interactive: yes".to_string());
    }
    if let Some(worker) = &job.worker {
        lines.push(format!("Worker:      {worker}"));
    }
    lines.push(format!(
        "Created:     {} ({} ago)",
        job.created_at.to_rfc3339(),
        format_time_ago(job.created_at, now)
    ));
    if let Some(at) = job.started_at {
        lines.push(format!("Started:     {}", at.to_rfc3339()));
    }
    if let Some(at) = job.ended_at() {
        lines.push(format!("Ended:       {}", at.to_rfc3339()));
    }
    lines.push(format!("Elapsed:     {}", format_elapsed(job, now)));
    lines
}

/// Pretty JSON for `-o json`.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
