// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced wrappers for consistent observability

use async_trait::async_trait;
use je_core::metrics::Labels;
use je_core::{Job, JobId, Metrics};
use je_storage::{Store, StoreError};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any Store
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Store for TracedStore<S> {
    fn next_id(&self) -> JobId {
        self.inner.next_id()
    }

    async fn save(&self, job: &mut Job) -> Result<(), StoreError> {
        let span = tracing::debug_span!("store.save", job_id = %job.id, state = %job.state);
        async {
            let start = Instant::now();
            let result = self.inner.save(job).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::debug!(job_id = %job.id, elapsed_ms, "saved"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "save failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        let result = self.inner.get(id).await;
        if let Err(ref e) = result {
            if !e.is_not_found() {
                tracing::error!(job_id = %id, error = %e, "get failed");
            }
        }
        result
    }

    async fn find(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        let result = self.inner.find(ids).await;
        tracing::trace!(count = ids.len(), ok = result.is_ok(), "find");
        result
    }

    async fn all(&self) -> Result<Vec<Job>, StoreError> {
        self.inner.all().await
    }

    async fn search(&self, query: &str) -> Result<Vec<Job>, StoreError> {
        async {
            let start = Instant::now();
            let result = self.inner.search(query).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(jobs) => tracing::debug!(hits = jobs.len(), elapsed_ms, "searched"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "search failed"),
            }
            result
        }
        .instrument(tracing::debug_span!("store.search", query))
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let result = self.inner.close().await;
        match &result {
            Ok(()) => tracing::info!("store closed"),
            Err(e) => tracing::error!(error = %e, "store close failed"),
        }
        result
    }
}

/// Metrics sink that writes each sample as a `debug!` event on the
/// `metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl Metrics for TracingMetrics {
    fn incr(&self, name: &str, labels: Labels<'_>) {
        tracing::debug!(target: "metrics", metric = name, ?labels, "incr");
    }

    fn observe(&self, name: &str, value: f64, labels: Labels<'_>) {
        tracing::debug!(target: "metrics", metric = name, value, ?labels, "observe");
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
