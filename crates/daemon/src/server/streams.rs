// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data stream routes: read, follow and append.

use super::{body_reader, flag, parse_id, ApiError, AppState};
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use je_adapters::Tail;
use je_core::{DataKind, JobId, ParseDataKindError};
use je_storage::Store;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// A follow ends once the job is terminal and no line arrived for this long.
const FOLLOW_IDLE: Duration = Duration::from_millis(250);

#[derive(Debug, Default, Deserialize)]
pub(super) struct FollowParams {
    follow: Option<String>,
}

pub(super) async fn logs(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<FollowParams>,
) -> Result<Response, ApiError> {
    open(&state, &raw, DataKind::Logs, flag(&params.follow)).await
}

pub(super) async fn output(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<FollowParams>,
) -> Result<Response, ApiError> {
    open(&state, &raw, DataKind::Output, flag(&params.follow)).await
}

pub(super) async fn input(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    open(&state, &raw, DataKind::Input, false).await
}

/// A job that has not written a stream yet reads as empty.
async fn open(state: &AppState, raw: &str, kind: DataKind, follow: bool) -> Result<Response, ApiError> {
    let id = parse_id(raw)?;
    state.deps.store.get(id).await?;

    let body = if follow {
        follow_body(state, id, kind)
    } else {
        match state.deps.data.read(id, kind).await {
            Ok(reader) => Body::from_stream(ReaderStream::new(reader)),
            Err(e) if e.is_not_found() => Body::empty(),
            Err(e) => return Err(e.into()),
        }
    };
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

struct Follow {
    id: JobId,
    tail: Tail,
    store: Arc<dyn Store>,
    // Stops the tail when the client goes away.
    _guard: DropGuard,
}

impl Follow {
    async fn next(&mut self) -> Option<String> {
        loop {
            match tokio::time::timeout(FOLLOW_IDLE, self.tail.next_line()).await {
                Ok(Ok(Some(line))) => return Some(line),
                Ok(Ok(None)) => return None,
                Ok(Err(e)) => {
                    warn!(job_id = %self.id, error = %e, "follow ended with read error");
                    return None;
                }
                Err(_) => match self.store.get(self.id).await {
                    Ok(job) if job.is_terminal() => {
                        debug!(job_id = %self.id, "follow finished");
                        return None;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(job_id = %self.id, error = %e, "follow lost the job record");
                        return None;
                    }
                },
            }
        }
    }
}

fn follow_body(state: &AppState, id: JobId, kind: DataKind) -> Body {
    let cancel = CancellationToken::new();
    let follow = Follow {
        id,
        tail: state.deps.data.tail(id, kind, cancel.clone()),
        store: state.deps.store.clone(),
        _guard: cancel.drop_guard(),
    };
    let lines = futures_util::stream::unfold(follow, |mut follow| async move {
        let line = follow.next().await?;
        Some((Ok::<_, std::io::Error>(Bytes::from(line + "\n")), follow))
    });
    Body::from_stream(lines)
}

/// Append the request body to one of a job's streams.
pub(super) async fn append(
    State(state): State<AppState>,
    Path((raw, kind)): Path<(String, String)>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw)?;
    let kind: DataKind = kind
        .parse()
        .map_err(|e: ParseDataKindError| ApiError::bad_request(e.to_string()))?;

    let io_error = |e: std::io::Error| ApiError::Internal(format!("writing {kind} for job {id}: {e}"));
    let mut writer = state.deps.data.write(id, kind).await?;
    let written = tokio::io::copy(&mut body_reader(body), &mut writer)
        .await
        .map_err(io_error)?;
    writer.shutdown().await.map_err(io_error)?;
    debug!(job_id = %id, %kind, bytes = written, "stream appended");
    Ok(StatusCode::OK)
}
