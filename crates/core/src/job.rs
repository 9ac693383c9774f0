// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and lifecycle state machine.
//!
//! ```text
//! CREATED ─enqueue─> WAITING ─start─> RUNNING ─stop──> STOPPED
//!                       │                 ├────kill──> KILLED
//!                       └─────error───────┴───error──> ERRORED
//! ```
//!
//! The methods here are pure: they validate the edge, stamp the matching
//! timestamp and nothing else. Persistence, process control and waiter
//! notification live with the owner of the live job.

use crate::id::JobId;
use crate::worker::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    #[default]
    Created,
    Waiting,
    Running,
    Stopped,
    Killed,
    Errored,
}

impl JobState {
    pub const ALL: [JobState; 6] = [
        JobState::Created,
        JobState::Waiting,
        JobState::Running,
        JobState::Stopped,
        JobState::Killed,
        JobState::Errored,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Stopped | JobState::Killed | JobState::Errored)
    }

    /// Whether `self -> to` is an edge of the state machine.
    pub fn can_transition_to(self, to: JobState) -> bool {
        matches!(
            (self, to),
            (JobState::Created, JobState::Waiting)
                | (JobState::Waiting, JobState::Running)
                | (JobState::Waiting, JobState::Errored)
                | (JobState::Running, JobState::Stopped)
                | (JobState::Running, JobState::Killed)
                | (JobState::Running, JobState::Errored)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Created => "CREATED",
            JobState::Waiting => "WAITING",
            JobState::Running => "RUNNING",
            JobState::Stopped => "STOPPED",
            JobState::Killed => "KILLED",
            JobState::Errored => "ERRORED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job state: {0:?}")]
pub struct ParseJobStateError(pub String);

impl FromStr for JobState {
    type Err = ParseJobStateError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseJobStateError(s.to_string()))
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("job {id}: invalid transition {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobState,
        to: JobState,
    },
}

/// Persisted execution record of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerId>,
    #[serde(default)]
    pub state: JobState,
    /// Exit code; meaningful once terminal. `-1` when killed by a signal.
    #[serde(default)]
    pub status: i32,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "started", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "stopped", default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(rename = "killed", default, skip_serializing_if = "Option::is_none")]
    pub killed_at: Option<DateTime<Utc>>,
    #[serde(rename = "errored", default, skip_serializing_if = "Option::is_none")]
    pub errored_at: Option<DateTime<Utc>>,
}

impl Job {
    /// New CREATED job with an unassigned id.
    pub fn new(
        name: impl Into<String>,
        args: Vec<String>,
        interactive: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::UNASSIGNED,
            name: name.into(),
            args,
            interactive,
            worker: None,
            state: JobState::Created,
            status: 0,
            created_at: now,
            started_at: None,
            stopped_at: None,
            killed_at: None,
            errored_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// CREATED -> WAITING
    pub fn enqueue(&mut self, _now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Waiting)
    }

    /// WAITING -> RUNNING, recording the worker that picked the job up.
    pub fn start(&mut self, worker: WorkerId, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Running)?;
        self.started_at = Some(self.clamp(now));
        self.worker = Some(worker);
        Ok(())
    }

    /// RUNNING -> STOPPED
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Stopped)?;
        self.stopped_at = Some(self.clamp(now));
        Ok(())
    }

    /// RUNNING -> KILLED
    pub fn kill(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Killed)?;
        self.killed_at = Some(self.clamp(now));
        Ok(())
    }

    /// RUNNING or WAITING -> ERRORED.
    ///
    /// A job that errors before it ever ran is stamped as started and
    /// errored at the same instant.
    pub fn error(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        let was_waiting = self.state == JobState::Waiting;
        self.transition(JobState::Errored)?;
        let at = self.clamp(now);
        if was_waiting {
            self.started_at = Some(at);
        }
        self.errored_at = Some(at);
        Ok(())
    }

    /// The terminal timestamp, if the job has finished.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.stopped_at.or(self.killed_at).or(self.errored_at)
    }

    /// Run time so far (or in total, once finished).
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let started = self.started_at?;
        Some(self.ended_at().unwrap_or(now) - started)
    }

    /// Check the record invariants: the terminal timestamp matches the
    /// state, `started_at` is set iff the job left WAITING, and
    /// timestamps never decrease.
    pub fn validate(&self) -> Result<(), String> {
        let terminal = [
            (JobState::Stopped, self.stopped_at),
            (JobState::Killed, self.killed_at),
            (JobState::Errored, self.errored_at),
        ];
        for (state, at) in terminal {
            if at.is_some() != (self.state == state) {
                return Err(format!("{} timestamp does not match state {}", state, self.state));
            }
        }

        let pending = matches!(self.state, JobState::Created | JobState::Waiting);
        if self.started_at.is_some() == pending {
            return Err(format!("started timestamp does not match state {}", self.state));
        }

        if let Some(started) = self.started_at {
            if started < self.created_at {
                return Err("started before created".to_string());
            }
            if self.ended_at().is_some_and(|ended| ended < started) {
                return Err("ended before started".to_string());
            }
        }
        Ok(())
    }

    fn transition(&mut self, to: JobState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition {
                id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Timestamps never go backwards even if the wall clock does.
    fn clamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let latest = self.started_at.unwrap_or(self.created_at);
        now.max(latest)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
