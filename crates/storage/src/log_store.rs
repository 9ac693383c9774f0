// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store on top of the embedded [`KvLog`].
//!
//! Keys are the 8-byte big-endian job id, values the JSON record. Ids come
//! from the log's persistent sequence. The search index lives in memory
//! and is rebuilt from the log on open.

use crate::index::{Document, MemoryIndex, PeriodicIndexer, Query};
use crate::kv::KvLog;
use crate::store::search_hits;
use crate::{Store, StoreError, StoreOptions};
use async_trait::async_trait;
use je_core::{Job, JobId};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Index flush interval for the log store.
pub const LOG_INDEX_INTERVAL: Duration = Duration::from_millis(8);

pub struct LogStore {
    log: Mutex<KvLog>,
    path: PathBuf,
    indexer: PeriodicIndexer<MemoryIndex>,
    closed: AtomicBool,
}

impl LogStore {
    /// Open (or create) the store at `path`. Must be called inside a
    /// tokio runtime.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with(path, StoreOptions::with_interval(LOG_INDEX_INTERVAL))
    }

    pub fn open_with(path: &Path, options: StoreOptions) -> Result<Self, StoreError> {
        let start = Instant::now();
        let log = KvLog::open(path)?;

        let indexer = PeriodicIndexer::spawn_with_metrics(
            MemoryIndex::new(),
            options.index_interval,
            options.metrics,
        );
        let mut skipped = 0usize;
        for (key, value) in log.entries()? {
            match serde_json::from_str::<Job>(&value) {
                Ok(job) => indexer.index(Document::from_job(&job)),
                Err(e) => {
                    skipped += 1;
                    warn!(key = ?JobId::from_key(&key), error = %e, "unreadable job record, not indexed");
                }
            }
        }
        let indexed = indexer.flush();

        info!(
            path = %path.display(),
            jobs = indexed,
            skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "opened job store",
        );

        Ok(Self {
            log: Mutex::new(log),
            path: path.to_owned(),
            indexer,
            closed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the log if superseded records outnumber live ones.
    /// Returns whether a compaction ran.
    pub fn compact_if_needed(&self) -> Result<bool, StoreError> {
        let mut log = self.log.lock();
        if !log.needs_compaction() {
            return Ok(false);
        }
        log.compact()?;
        Ok(true)
    }

    /// Unconditional compaction.
    pub fn compact(&self) -> Result<(), StoreError> {
        self.log.lock().compact()?;
        Ok(())
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
impl Store for LogStore {
    fn next_id(&self) -> JobId {
        JobId(self.log.lock().next_sequence())
    }

    async fn save(&self, job: &mut Job) -> Result<(), StoreError> {
        self.check_open()?;
        {
            let mut log = self.log.lock();
            if job.id.is_unassigned() {
                job.id = JobId(log.next_sequence());
            } else {
                log.advance_sequence(job.id.get());
            }
            let value = serde_json::to_string(&*job)?;
            log.put(&job.id.to_key(), &value)?;
        }
        self.indexer.index(Document::from_job(job));
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        let value = self.log.lock().get(&id.to_key())?;
        let value = value.ok_or(StoreError::NotFound(id))?;
        Ok(serde_json::from_str(&value)?)
    }

    async fn all(&self) -> Result<Vec<Job>, StoreError> {
        let entries = self.log.lock().entries()?;
        entries
            .into_iter()
            .map(|(_, value)| Ok(serde_json::from_str(&value)?))
            .collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Job>, StoreError> {
        let query = Query::parse(query)?;
        let hits = self.indexer.search(&query);
        search_hits(self, hits).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        self.indexer.close();
        self.log.lock().sync()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_store_tests.rs"]
mod tests;
