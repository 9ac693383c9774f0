// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job byte streams: stdin, stdout and stderr.
//!
//! A [`Data`] backend stores one stream per `(JobId, DataKind)`. Input is
//! written once; output and logs are appended while the job runs and can
//! be followed line by line with [`Data::tail`].

mod local;
mod remote;

pub use local::{LocalData, DEFAULT_TAIL_POLL};
pub use remote::RemoteData;

use crate::ClientError;
use async_trait::async_trait;
use je_core::{DataKind, JobId};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type DataReader = Pin<Box<dyn AsyncRead + Send>>;
pub type DataWriter = Pin<Box<dyn AsyncWrite + Send>>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no {kind} stream for job {id}")]
    NotFound { id: JobId, kind: DataKind },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote data: {0}")]
    Remote(#[from] ClientError),
}

impl DataError {
    pub fn is_not_found(&self) -> bool {
        match self {
            DataError::NotFound { .. } => true,
            DataError::Remote(e) => e.is_not_found(),
            DataError::Io(_) => false,
        }
    }
}

/// A live follow of one stream.
///
/// `lines` yields each complete line (without its terminator) as it is
/// appended. A read error is delivered once on `errors`, after which
/// `lines` closes. Dropping both receivers stops the background reader.
pub struct Tail {
    pub lines: mpsc::Receiver<String>,
    pub errors: mpsc::Receiver<DataError>,
}

impl Tail {
    /// Next line, or `Err` if the follow ended with a read error.
    /// `Ok(None)` means the follow was cancelled.
    pub async fn next_line(&mut self) -> Result<Option<String>, DataError> {
        match self.lines.recv().await {
            Some(line) => Ok(Some(line)),
            None => match self.errors.try_recv() {
                Ok(err) => Err(err),
                Err(_) => Ok(None),
            },
        }
    }
}

/// Channel capacity of a [`Tail`] line buffer.
pub(crate) const TAIL_BUFFER: usize = 64;

#[async_trait]
pub trait Data: Send + Sync + 'static {
    /// Open a stream for reading from the start.
    async fn read(&self, id: JobId, kind: DataKind) -> Result<DataReader, DataError>;

    /// Open a stream for writing. Input is truncated; output and logs are
    /// appended to. Shut the writer down to flush it.
    async fn write(&self, id: JobId, kind: DataKind) -> Result<DataWriter, DataError>;

    /// Follow a stream until `cancel` fires or a read error occurs.
    fn tail(&self, id: JobId, kind: DataKind, cancel: CancellationToken) -> Tail;
}
