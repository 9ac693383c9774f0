// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP API.
//!
//! Every route is a thin handler over [`TaskDeps`], the configured
//! [`Queue`] and, when workers run in-process, the [`Pool`].

mod bus;
mod error;
mod jobs;
mod streams;

pub use error::ApiError;

use axum::body::Body;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use futures_util::TryStreamExt;
use je_adapters::LocalBus;
use je_core::JobId;
use je_engine::{Pool, Queue, TaskDeps};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub deps: TaskDeps,
    pub queue: Arc<dyn Queue>,
    /// Present when jobs run in this process.
    pub pool: Option<Pool>,
    /// Served at `/bus` for `jed worker` processes.
    pub bus: LocalBus,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(version))
        .route("/create/*name", post(jobs::create))
        .route("/search", get(jobs::search))
        .route("/search/:id", get(jobs::search_one))
        .route("/update/:id", post(jobs::update))
        .route("/kill/:id", post(jobs::kill))
        .route("/write/:id", post(jobs::write))
        .route("/close/:id", post(jobs::close))
        .route("/logs/:id", get(streams::logs))
        .route("/output/:id", get(streams::output))
        .route("/read/:id", get(streams::input))
        .route("/write/:id/:kind", post(streams::append))
        .route("/workers", get(bus::workers))
        .route("/bus/:topic", get(bus::poll).post(bus::publish))
        .route_layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .with_state(state)
}

pub fn version_string() -> String {
    format!("Job Engine {}", env!("CARGO_PKG_VERSION"))
}

async fn version() -> String {
    version_string()
}

async fn count_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    state
        .deps
        .metrics
        .incr("server_requests", &[("method", method.as_str()), ("path", path.as_str())]);
    next.run(req).await
}

/// Path ids are positive decimals.
fn parse_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse()
        .map_err(|e: je_core::ParseJobIdError| ApiError::bad_request(e.to_string()))
}

/// A request body as a byte reader.
fn body_reader(body: Body) -> impl AsyncRead + Send + Unpin {
    StreamReader::new(Box::pin(body.into_data_stream().map_err(std::io::Error::other)))
}

/// Query flags are on when present with any non-empty value.
fn flag(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
