// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping of engine errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use je_adapters::{DataError, ErrorBody};
use je_core::JobId;
use je_engine::{PoolError, QueueError, TaskError};
use je_storage::StoreError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String, id: Option<JobId> },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::NotFound { message, id } => ErrorBody { error: message, id },
            ApiError::BadRequest(error) | ApiError::Unavailable(error) | ApiError::Internal(error) => {
                ErrorBody { error, id: None }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ApiError::NotFound {
                message: e.to_string(),
                id: Some(id),
            },
            StoreError::Query(_) => ApiError::BadRequest(e.to_string()),
            StoreError::Closed => ApiError::Unavailable(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::NotFound { id, .. } => ApiError::NotFound {
                message: e.to_string(),
                id: Some(id),
            },
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::InvalidOperation { .. } | TaskError::Transition(_) => {
                ApiError::BadRequest(e.to_string())
            }
            TaskError::Store(e) => e.into(),
            TaskError::Data(e) => e.into(),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Full | QueueError::Closed => ApiError::Unavailable(e.to_string()),
            QueueError::Task(e) => e.into(),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PoolError> for ApiError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::TaskNotFound(id) => ApiError::NotFound {
                message: e.to_string(),
                id: Some(id),
            },
            PoolError::WorkerNotFound(_) => ApiError::NotFound {
                message: e.to_string(),
                id: None,
            },
            PoolError::Idle(_) => ApiError::BadRequest(e.to_string()),
            PoolError::Queue(e) => e.into(),
            PoolError::Task(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
