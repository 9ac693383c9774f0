// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job routes: create, search, update and control of live tasks.

use super::{body_reader, flag, parse_id, ApiError, AppState};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use je_core::{DataKind, Job, JobId, JobState};
use je_engine::{PoolError, Task};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Store poll interval when waiting on a job that runs elsewhere.
const WAIT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct CreateParams {
    pub args: Vec<String>,
    pub interactive: bool,
    pub wait: bool,
}

impl CreateParams {
    /// Arguments come as repeated `arg` values or one space-separated
    /// `args` value.
    pub fn from_query(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "arg" => params.args.push(value),
                "args" => params
                    .args
                    .extend(value.split_whitespace().map(str::to_string)),
                "interactive" => params.interactive = !value.is_empty(),
                "wait" => params.wait = !value.is_empty(),
                _ => {}
            }
        }
        params
    }
}

pub(super) async fn create(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    body: Body,
) -> Result<Response, ApiError> {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return Err(ApiError::bad_request("missing job name"));
    }
    let params = CreateParams::from_query(query);

    let task = Task::create(state.deps.clone(), name, params.args, params.interactive).await?;
    if let Err(e) = submit(&state, &task, body).await {
        abandon(&task, &e).await;
        return Err(e);
    }
    if params.wait {
        wait_for(&state, &task).await?;
    }
    Ok(Redirect::to(&format!("/search/{}", task.id())).into_response())
}

/// Store the request body as the job's input, then queue the job.
async fn submit(state: &AppState, task: &Arc<Task>, body: Body) -> Result<(), ApiError> {
    let id = task.id();
    let mut input = state.deps.data.write(id, DataKind::Input).await?;
    let written = tokio::io::copy(&mut body_reader(body), &mut input)
        .await
        .map_err(|e| ApiError::Internal(format!("writing input for job {id}: {e}")))?;
    input
        .shutdown()
        .await
        .map_err(|e| ApiError::Internal(format!("closing input for job {id}: {e}")))?;
    debug!(job_id = %id, bytes = written, "input stored");

    state.queue.submit(task.clone()).await?;
    Ok(())
}

/// Resolve a job that could not be queued so it does not linger as
/// CREATED or WAITING.
async fn abandon(task: &Task, err: &ApiError) {
    if task.state() == JobState::Created {
        if let Err(e) = task.enqueue().await {
            warn!(job_id = %task.id(), error = %e, "failed to enqueue abandoned job");
            return;
        }
    }
    if task.state() == JobState::Waiting {
        if let Err(e) = task.error(err).await {
            warn!(job_id = %task.id(), error = %e, "failed to record submit error");
        }
    }
}

async fn wait_for(state: &AppState, task: &Task) -> Result<(), ApiError> {
    if state.pool.is_some() {
        task.wait().await;
        return Ok(());
    }
    loop {
        if state.deps.store.get(task.id()).await?.is_terminal() {
            return Ok(());
        }
        tokio::time::sleep(WAIT_POLL).await;
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
    ids: Option<String>,
}

fn parse_ids(raw: &str) -> Result<Vec<JobId>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_id)
        .collect()
}

/// `ids` wins over `q`; neither returns every job.
pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let store = &state.deps.store;
    let ids = params.ids.as_deref().filter(|s| !s.trim().is_empty());
    let q = params.q.as_deref().filter(|s| !s.trim().is_empty());

    let jobs = match (ids, q) {
        (Some(ids), _) => store.find(&parse_ids(ids)?).await?,
        (None, Some(q)) => store.search(q).await?,
        (None, None) => store.all().await?,
    };
    Ok(Json(jobs))
}

pub(super) async fn search_one(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let job = state.deps.store.get(parse_id(&raw)?).await?;
    Ok(Json(vec![job]))
}

/// Upsert a record. A non-zero path id overrides the body; zero asks the
/// store to assign one.
pub(super) async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(mut job): Json<Job>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let id: u64 = raw
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid job id: {raw:?}")))?;
    if id != 0 {
        job.id = JobId(id);
    }
    job.validate().map_err(ApiError::BadRequest)?;
    state.deps.store.save(&mut job).await?;
    debug!(job_id = %job.id, state = %job.state, "record updated");
    Ok(Json(vec![job]))
}

/// The live task for `id`, or why there is none.
async fn live_task(state: &AppState, id: JobId) -> Result<Arc<Task>, ApiError> {
    if let Some(task) = state.pool.as_ref().and_then(|pool| pool.task(id).ok()) {
        return Ok(task);
    }
    let job = state.deps.store.get(id).await?;
    if job.is_terminal() {
        return Err(ApiError::bad_request(format!(
            "job {id} has already finished ({})",
            job.state
        )));
    }
    Err(PoolError::TaskNotFound(id).into())
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct KillParams {
    force: Option<String>,
}

pub(super) async fn kill(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<KillParams>,
) -> Result<StatusCode, ApiError> {
    let task = live_task(&state, parse_id(&raw)?).await?;
    task.kill(flag(&params.force)).await?;
    Ok(StatusCode::OK)
}

/// Feed an interactive job's stdin. Blocks until the process starts.
pub(super) async fn write(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Body,
) -> Result<StatusCode, ApiError> {
    let task = live_task(&state, parse_id(&raw)?).await?;
    let written = task.write(&mut body_reader(body)).await?;
    debug!(job_id = %task.id(), bytes = written, "stdin written");
    Ok(StatusCode::OK)
}

pub(super) async fn close(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task = live_task(&state, parse_id(&raw)?).await?;
    task.close().await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
