// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the execution engine

use je_adapters::{BusError, DataError};
use je_core::{JobId, TransitionError, WorkerId};
use je_storage::StoreError;
use thiserror::Error;

/// Errors from operations on a live [`crate::Task`].
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("job {id}: {message}")]
    InvalidOperation { id: JobId, message: String },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("failed to start {name:?}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
}

impl TaskError {
    pub(crate) fn invalid(id: JobId, message: impl Into<String>) -> Self {
        TaskError::InvalidOperation {
            id,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("queue is closed")]
    Closed,
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    #[error("encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),
    #[error("worker {0} is idle")]
    Idle(WorkerId),
    #[error("no running task for job {0}")]
    TaskNotFound(JobId),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Task(#[from] TaskError),
}
