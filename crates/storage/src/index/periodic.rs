// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batched index writer.
//!
//! Writers push [`IndexOp`]s into a buffer guarded by its own lock and
//! return immediately. A background task swaps the buffer out on every
//! tick and applies it to the index under the index write lock, so a
//! search sees either none or all of a batch. A search issued right after
//! a write may miss it until the next tick.

use super::{IndexOp, Query, SearchIndex};
use je_core::{JobId, Metrics, NoOpMetrics};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

struct Shared<I> {
    index: RwLock<I>,
    batch: Mutex<Vec<IndexOp>>,
    metrics: Arc<dyn Metrics>,
}

impl<I: SearchIndex> Shared<I> {
    /// Batches are taken under the index write lock so concurrent
    /// flushes apply them in the order they were queued.
    fn flush(&self) -> usize {
        let mut index = self.index.write();
        let batch = std::mem::take(&mut *self.batch.lock());
        if batch.is_empty() {
            return 0;
        }
        let size = batch.len();
        let start = Instant::now();
        index.apply(batch);
        drop(index);
        let elapsed = start.elapsed();

        self.metrics.observe("index_flush", elapsed.as_secs_f64(), &[]);
        self.metrics.observe("index_batch_size", size as f64, &[]);
        trace!(size, elapsed_us = elapsed.as_micros() as u64, "flushed index batch");
        size
    }
}

pub struct PeriodicIndexer<I> {
    shared: Arc<Shared<I>>,
    cancel: CancellationToken,
}

impl<I: SearchIndex> PeriodicIndexer<I> {
    /// Wrap `index` and start the flush task. Must be called inside a
    /// tokio runtime.
    pub fn spawn(index: I, interval: Duration) -> Self {
        Self::spawn_with_metrics(index, interval, Arc::new(NoOpMetrics))
    }

    pub fn spawn_with_metrics(index: I, interval: Duration, metrics: Arc<dyn Metrics>) -> Self {
        let shared = Arc::new(Shared {
            index: RwLock::new(index),
            batch: Mutex::new(Vec::new()),
            metrics,
        });
        let cancel = CancellationToken::new();
        spawn_flush_task(Arc::downgrade(&shared), interval, cancel.clone());
        Self { shared, cancel }
    }

    pub fn index(&self, doc: super::Document) {
        self.push(IndexOp::Index(doc));
    }

    pub fn delete(&self, id: JobId) {
        self.push(IndexOp::Delete(id));
    }

    pub fn set_internal(&self, key: impl Into<String>, value: Vec<u8>) {
        self.push(IndexOp::SetInternal(key.into(), value));
    }

    pub fn delete_internal(&self, key: impl Into<String>) {
        self.push(IndexOp::DeleteInternal(key.into()));
    }

    fn push(&self, op: IndexOp) {
        self.shared.batch.lock().push(op);
    }

    /// Searches the flushed index only.
    pub fn search(&self, query: &Query) -> Vec<JobId> {
        self.shared.index.read().search(query)
    }

    pub fn get_internal(&self, key: &str) -> Option<Vec<u8>> {
        self.shared.index.read().get_internal(key)
    }

    pub fn doc_count(&self) -> usize {
        self.shared.index.read().doc_count()
    }

    /// Ops waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.shared.batch.lock().len()
    }

    /// Apply the pending batch now; returns how many ops were applied.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    /// Stop the flush task after applying whatever is pending.
    pub fn close(&self) {
        self.cancel.cancel();
        self.shared.flush();
    }
}

impl<I> Drop for PeriodicIndexer<I> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_flush_task<I: SearchIndex>(
    shared: Weak<Shared<I>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(shared) = shared.upgrade() else {
                        break;
                    };
                    shared.flush();
                }
            }
        }
        debug!("index flush task stopped");
    });
}

#[cfg(test)]
#[path = "periodic_tests.rs"]
mod tests;
