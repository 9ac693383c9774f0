// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{BusError, Message, MessageBus, Subscription};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// In-process bus: one FIFO per topic.
#[derive(Clone, Default)]
pub struct LocalBus {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    topics: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
    published: Notify,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest message on `topic` without waiting.
    pub fn try_pop(&self, topic: &str) -> Option<Vec<u8>> {
        self.inner.topics.lock().get_mut(topic)?.pop_front()
    }

    /// Take the oldest message on `topic`, waiting for one if needed.
    pub async fn pop(&self, topic: &str) -> Vec<u8> {
        loop {
            let notified = self.inner.published.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(payload) = self.try_pop(topic) {
                return payload;
            }
            notified.await;
        }
    }

    /// Messages waiting on `topic`.
    pub fn depth(&self, topic: &str) -> usize {
        self.inner.topics.lock().get(topic).map_or(0, VecDeque::len)
    }

    fn push(&self, topic: &str, payload: Vec<u8>) {
        self.inner
            .topics
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push_back(payload);
        self.inner.published.notify_waiters();
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.push(topic, payload);
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let bus = self.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            // Reserve before popping so a dropped subscription loses nothing.
            while let Ok(permit) = tx.reserve().await {
                tokio::select! {
                    _ = tx.closed() => break,
                    payload = bus.pop(&topic) => permit.send(Message {
                        topic: topic.clone(),
                        payload,
                    }),
                }
            }
        });
        Subscription::new(rx)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
