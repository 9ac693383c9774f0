// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streams as plain files: `{root}/{id}.{in,out,log}`.

use super::{Data, DataError, DataReader, DataWriter, Tail, TAIL_BUFFER};
use async_trait::async_trait;
use je_core::{DataKind, JobId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How often a tail checks its file for appended bytes.
pub const DEFAULT_TAIL_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct LocalData {
    root: PathBuf,
    poll_interval: Duration,
}

impl LocalData {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            poll_interval: DEFAULT_TAIL_POLL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, id: JobId, kind: DataKind) -> PathBuf {
        self.root.join(format!("{id}.{}", kind.extension()))
    }
}

#[async_trait]
impl Data for LocalData {
    async fn read(&self, id: JobId, kind: DataKind) -> Result<DataReader, DataError> {
        match File::open(self.path(id, kind)).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DataError::NotFound { id, kind }),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, id: JobId, kind: DataKind) -> Result<DataWriter, DataError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let mut options = OpenOptions::new();
        options.create(true);
        match kind {
            DataKind::Input => options.write(true).truncate(true),
            DataKind::Output | DataKind::Logs => options.append(true),
        };
        let file = options.open(self.path(id, kind)).await?;
        Ok(Box::pin(file))
    }

    fn tail(&self, id: JobId, kind: DataKind, cancel: CancellationToken) -> Tail {
        let (lines_tx, lines) = mpsc::channel(TAIL_BUFFER);
        let (errors_tx, errors) = mpsc::channel(1);
        let follower = Follower {
            path: self.path(id, kind),
            poll_interval: self.poll_interval,
            cancel,
            lines: lines_tx,
        };
        tokio::spawn(async move {
            if let Err(e) = follower.run().await {
                tracing::warn!(job_id = %id, %kind, error = %e, "tail stopped on read error");
                let _ = errors_tx.send(DataError::Io(e)).await;
            }
        });
        Tail { lines, errors }
    }
}

/// Background reader behind one [`Tail`].
struct Follower {
    path: PathBuf,
    poll_interval: Duration,
    cancel: CancellationToken,
    lines: mpsc::Sender<String>,
}

impl Follower {
    /// Ok(()) on cancel or when the consumer goes away.
    async fn run(self) -> std::io::Result<()> {
        let mut file = loop {
            match File::open(&self.path).await {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if !self.pause().await {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        };

        let mut pending: Vec<u8> = Vec::new();
        let mut buf = vec![0u8; 8192];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                if !self.pause().await {
                    return Ok(());
                }
                continue;
            }

            pending.extend_from_slice(&buf[..n]);
            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
                tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(()),
                    sent = self.lines.send(line) => {
                        if sent.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Sleep one poll interval. False when the follow should end.
    async fn pause(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = self.lines.closed() => false,
            _ = tokio::time::sleep(self.poll_interval) => true,
        }
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
