// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streams proxied over HTTP to a job server.

use super::{Data, DataError, DataReader, DataWriter, Tail, TAIL_BUFFER};
use crate::{Client, ClientError};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use je_core::{DataKind, JobId};
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader, DuplexStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::io::{ReaderStream, StreamReader};
use tokio_util::sync::CancellationToken;

/// Size of the in-memory pipe feeding an upload.
const UPLOAD_PIPE: usize = 64 * 1024;

#[derive(Clone)]
pub struct RemoteData {
    client: Client,
}

impl RemoteData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn open(&self, id: JobId, kind: DataKind, follow: bool) -> Result<DataReader, DataError> {
        let resp = self
            .client
            .open(id, kind, follow)
            .await
            .map_err(|e| not_found(e, id, kind))?;
        let body = resp.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(body)))
    }
}

fn not_found(err: ClientError, id: JobId, kind: DataKind) -> DataError {
    if err.is_not_found() {
        DataError::NotFound { id, kind }
    } else {
        DataError::Remote(err)
    }
}

#[async_trait]
impl Data for RemoteData {
    async fn read(&self, id: JobId, kind: DataKind) -> Result<DataReader, DataError> {
        self.open(id, kind, false).await
    }

    async fn write(&self, id: JobId, kind: DataKind) -> Result<DataWriter, DataError> {
        let (pipe, upload_side) = tokio::io::duplex(UPLOAD_PIPE);
        let client = self.client.clone();
        let upload = tokio::spawn(async move {
            let body = reqwest::Body::wrap_stream(ReaderStream::new(upload_side));
            client.append(id, kind, body).await
        });
        Ok(Box::pin(UploadWriter {
            pipe,
            upload: Some(upload),
        }))
    }

    fn tail(&self, id: JobId, kind: DataKind, cancel: CancellationToken) -> Tail {
        let (lines_tx, lines) = mpsc::channel(TAIL_BUFFER);
        let (errors_tx, errors) = mpsc::channel(1);
        let data = self.clone();
        tokio::spawn(async move {
            let follow = async {
                let reader = data.open(id, kind, true).await?;
                let mut reader = BufReader::new(reader).lines();
                while let Some(line) = reader.next_line().await? {
                    if lines_tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok::<_, DataError>(())
            };
            let result = tokio::select! {
                _ = cancel.cancelled() => Ok(()),
                result = follow => result,
            };
            if let Err(e) = result {
                tracing::warn!(job_id = %id, %kind, error = %e, "remote tail stopped");
                let _ = errors_tx.send(e).await;
            }
        });
        Tail { lines, errors }
    }
}

/// Writer half of a streaming upload. Shutting it down ends the request
/// body and waits for the server's response.
struct UploadWriter {
    pipe: DuplexStream,
    upload: Option<JoinHandle<Result<(), ClientError>>>,
}

impl AsyncWrite for UploadWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().pipe).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().pipe).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(Pin::new(&mut this.pipe).poll_shutdown(cx))?;
        let Some(upload) = this.upload.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        let result = ready!(Pin::new(upload).poll(cx));
        this.upload = None;
        Poll::Ready(match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(io::Error::other(e)),
            Err(e) => Err(io::Error::other(e)),
        })
    }
}
