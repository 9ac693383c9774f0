// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch of submitted tasks to whoever executes them.

use crate::{QueueError, Task};
use async_trait::async_trait;
use je_adapters::MessageBus;
use je_core::JobState;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, OwnedPermit};

#[async_trait]
pub trait Queue: Send + Sync + 'static {
    /// Hand a task over for execution, moving it CREATED -> WAITING.
    /// Never blocks on capacity.
    async fn submit(&self, task: Arc<Task>) -> Result<(), QueueError>;

    /// Stop accepting submissions.
    fn close(&self);
}

/// Bounded in-process FIFO consumed by pool workers.
pub struct ChannelQueue {
    tx: Mutex<Option<mpsc::Sender<Arc<Task>>>>,
}

impl ChannelQueue {
    /// A queue holding at most `capacity` (at least one) waiting tasks,
    /// and the receiving end for workers.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Arc<Task>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn sender(&self) -> Result<mpsc::Sender<Arc<Task>>, QueueError> {
        self.tx.lock().clone().ok_or(QueueError::Closed)
    }

    /// Like [`Queue::submit`] but waits for capacity instead of failing.
    pub async fn submit_wait(&self, task: Arc<Task>) -> Result<(), QueueError> {
        let permit = self
            .sender()?
            .reserve_owned()
            .await
            .map_err(|_| QueueError::Closed)?;
        dispatch(permit, task).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().as_ref().map_or(true, mpsc::Sender::is_closed)
    }
}

/// Enqueue if needed, then send on an already reserved slot so a full
/// queue never leaves the job WAITING.
async fn dispatch(permit: OwnedPermit<Arc<Task>>, task: Arc<Task>) -> Result<(), QueueError> {
    if task.state() == JobState::Created {
        task.enqueue().await?;
    }
    permit.send(task);
    Ok(())
}

#[async_trait]
impl Queue for ChannelQueue {
    async fn submit(&self, task: Arc<Task>) -> Result<(), QueueError> {
        let permit = self.sender()?.try_reserve_owned().map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })?;
        dispatch(permit, task).await
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}

/// Publishes job records to a bus topic for remote workers.
pub struct BusQueue {
    bus: Arc<dyn MessageBus>,
    topic: String,
}

impl BusQueue {
    pub fn new(bus: Arc<dyn MessageBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl Queue for BusQueue {
    async fn submit(&self, task: Arc<Task>) -> Result<(), QueueError> {
        let job = if task.state() == JobState::Created {
            task.enqueue().await?
        } else {
            task.job()
        };
        let payload = serde_json::to_vec(&job)?;
        self.bus.publish(&self.topic, payload).await?;
        tracing::debug!(job_id = %job.id, topic = %self.topic, "published");
        Ok(())
    }

    fn close(&self) {}
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
