// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Store`] proxied to a job server over HTTP.

use crate::{Client, ClientError, SearchFilter};
use async_trait::async_trait;
use je_core::{Job, JobId};
use je_storage::{Store, StoreError};

#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
}

impl RemoteStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// 404s carry the missing id in their body; fall back to the id that
/// was asked for.
fn remote_error(requested: Option<JobId>, err: ClientError) -> StoreError {
    match err {
        ClientError::NotFound { id, message } => match id.or(requested) {
            Some(id) => StoreError::NotFound(id),
            None => StoreError::Remote(message),
        },
        other => StoreError::Remote(other.to_string()),
    }
}

#[async_trait]
impl Store for RemoteStore {
    /// Ids are assigned by the server on save.
    fn next_id(&self) -> JobId {
        JobId::UNASSIGNED
    }

    async fn save(&self, job: &mut Job) -> Result<(), StoreError> {
        let stored = self
            .client
            .update(job)
            .await
            .map_err(|e| remote_error(None, e))?;
        job.id = stored.id;
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        self.client.get(id).await.map_err(|e| remote_error(Some(id), e))
    }

    async fn find(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .search(&SearchFilter::Ids(ids.to_vec()))
            .await
            .map_err(|e| remote_error(None, e))
    }

    async fn all(&self) -> Result<Vec<Job>, StoreError> {
        self.client
            .search(&SearchFilter::All)
            .await
            .map_err(|e| remote_error(None, e))
    }

    async fn search(&self, query: &str) -> Result<Vec<Job>, StoreError> {
        self.client
            .search(&SearchFilter::Query(query.to_string()))
            .await
            .map_err(|e| remote_error(None, e))
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
