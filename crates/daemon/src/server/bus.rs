// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process bus and worker listing.

use super::{ApiError, AppState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use je_adapters::{MessageBus, WorkerInfo};

pub(super) async fn workers(State(state): State<AppState>) -> Json<Vec<WorkerInfo>> {
    let workers = state
        .pool
        .as_ref()
        .map(|pool| {
            pool.workers()
                .iter()
                .map(|worker| WorkerInfo {
                    id: worker.id().clone(),
                    job: worker.current_job(),
                })
                .collect()
        })
        .unwrap_or_default();
    Json(workers)
}

/// Next message on `topic`; 204 when there is none.
pub(super) async fn poll(State(state): State<AppState>, Path(topic): Path<String>) -> Response {
    match state.bus.try_pop(&topic) {
        Some(payload) => payload.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub(super) async fn publish(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    payload: Bytes,
) -> Result<StatusCode, ApiError> {
    state
        .bus
        .publish(&topic, payload.to_vec())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(StatusCode::OK)
}
