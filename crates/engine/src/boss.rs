// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feeds a local pool from a bus topic.

use crate::{Pool, Queue, Task, TaskDeps};
use je_adapters::{Message, MessageBus};
use je_core::Job;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns a [`Pool`] and a subscription. Each record received on the topic
/// becomes a [`Task`] (using `deps`, normally remote store and data) and
/// is dispatched to the pool in arrival order.
pub struct Boss {
    pool: Pool,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Boss {
    pub fn start(pool: Pool, bus: &dyn MessageBus, topic: &str, deps: TaskDeps) -> Self {
        let cancel = CancellationToken::new();
        let mut subscription = bus.subscribe(topic);
        let handle = tokio::spawn({
            let pool = pool.clone();
            let cancel = cancel.clone();
            async move {
                loop {
                    let message = tokio::select! {
                        _ = cancel.cancelled() => break,
                        message = subscription.recv() => match message {
                            Some(message) => message,
                            None => break,
                        },
                    };
                    dispatch(&pool, &deps, message).await;
                }
            }
        });
        info!(topic, "boss subscribed");
        Self {
            pool,
            cancel,
            handle,
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Stop taking messages, then let the pool drain and exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "boss loop panicked");
        }
        self.pool.close();
        self.pool.wait().await;
    }
}

async fn dispatch(pool: &Pool, deps: &TaskDeps, message: Message) {
    let job: Job = match serde_json::from_slice(&message.payload) {
        Ok(job) => job,
        Err(e) => {
            warn!(topic = %message.topic, error = %e, "dropping undecodable job record");
            return;
        }
    };
    let task = Task::from_record(job, deps.clone());
    if let Err(e) = pool.submit_wait(task.clone()).await {
        if let Err(err) = task.error(&e).await {
            warn!(job_id = %task.id(), error = %err, "failed to record dispatch error");
        }
    }
}

#[cfg(test)]
#[path = "boss_tests.rs"]
mod tests;
