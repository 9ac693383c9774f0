// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::index::QueryError;
use crate::kv::KvError;
use je_core::JobId;
use thiserror::Error;

/// Errors returned by [`crate::Store`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key does not exist: {0}")]
    NotFound(JobId),
    #[error(transparent)]
    Kv(#[from] KvError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
    #[error("remote store: {0}")]
    Remote(String),
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// The missing key, for [`StoreError::NotFound`].
    pub fn missing_key(&self) -> Option<JobId> {
        match self {
            StoreError::NotFound(id) => Some(*id),
            _ => None,
        }
    }
}
