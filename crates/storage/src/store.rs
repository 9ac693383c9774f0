// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job store contract shared by every backend.

use crate::StoreError;
use async_trait::async_trait;
use je_core::{Job, JobId, Metrics, NoOpMetrics};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Persistence and query surface for job records.
///
/// `get`, `find` and `all` read the primary records and always reflect
/// the latest `save`. `search` goes through the asynchronous index and
/// may lag behind by one flush interval.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Reserve an id ahead of `save`. Backends that assign ids elsewhere
    /// return [`JobId::UNASSIGNED`] and `save` assigns one.
    fn next_id(&self) -> JobId;

    /// Upsert by id. An unassigned id is replaced with a fresh one.
    async fn save(&self, job: &mut Job) -> Result<(), StoreError>;

    /// `NotFound(id)` when absent.
    async fn get(&self, id: JobId) -> Result<Job, StoreError>;

    /// Batch lookup in argument order. Fails with `NotFound` for the
    /// first missing id.
    async fn find(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        let mut jobs = Vec::with_capacity(ids.len());
        for &id in ids {
            jobs.push(self.get(id).await?);
        }
        Ok(jobs)
    }

    /// Every job in ascending id order.
    async fn all(&self) -> Result<Vec<Job>, StoreError>;

    /// Jobs matching a query string, in ascending id order.
    async fn search(&self, query: &str) -> Result<Vec<Job>, StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

/// Resolve index hits against the primary records.
///
/// Hits whose record has gone missing are skipped: the index may briefly
/// lag behind the store.
pub(crate) async fn search_hits(store: &dyn Store, hits: Vec<JobId>) -> Result<Vec<Job>, StoreError> {
    let mut jobs = Vec::with_capacity(hits.len());
    for id in hits {
        match store.get(id).await {
            Ok(job) => jobs.push(job),
            Err(StoreError::NotFound(_)) => {
                warn!(job_id = %id, "search hit missing from store, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(jobs)
}

/// Options shared by the local backends.
#[derive(Clone)]
pub struct StoreOptions {
    /// How often pending index updates are flushed.
    pub index_interval: Duration,
    pub metrics: Arc<dyn Metrics>,
}

impl StoreOptions {
    pub fn with_interval(index_interval: Duration) -> Self {
        Self {
            index_interval,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    pub fn metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }
}
