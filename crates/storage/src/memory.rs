// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job store.

use crate::index::{Document, MemoryIndex, PeriodicIndexer, Query};
use crate::store::search_hits;
use crate::{Store, StoreError, StoreOptions};
use async_trait::async_trait;
use je_core::{Job, JobId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Index flush interval for the memory store.
pub const MEMORY_INDEX_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
struct State {
    jobs: BTreeMap<JobId, Job>,
    /// Last id handed out
    last_id: u64,
}

/// Jobs kept in a map; nothing survives the process.
pub struct MemoryStore {
    state: Mutex<State>,
    indexer: PeriodicIndexer<MemoryIndex>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::with_interval(MEMORY_INDEX_INTERVAL))
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            state: Mutex::new(State::default()),
            indexer: PeriodicIndexer::spawn_with_metrics(
                MemoryIndex::new(),
                options.index_interval,
                options.metrics,
            ),
            closed: AtomicBool::new(false),
        }
    }

    /// Force pending index updates through.
    pub fn flush_index(&self) {
        self.indexer.flush();
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn next_id(&self) -> JobId {
        let mut state = self.state.lock();
        state.last_id += 1;
        JobId(state.last_id)
    }

    async fn save(&self, job: &mut Job) -> Result<(), StoreError> {
        self.check_open()?;
        {
            let mut state = self.state.lock();
            if job.id.is_unassigned() {
                state.last_id += 1;
                job.id = JobId(state.last_id);
            } else {
                // Ids saved from elsewhere must never be handed out again.
                state.last_id = state.last_id.max(job.id.get());
            }
            state.jobs.insert(job.id, job.clone());
        }
        self.indexer.index(Document::from_job(job));
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        self.state
            .lock()
            .jobs
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn all(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.lock().jobs.values().cloned().collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Job>, StoreError> {
        let query = Query::parse(query)?;
        let hits = self.indexer.search(&query);
        search_hits(self, hits).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        self.indexer.close();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
