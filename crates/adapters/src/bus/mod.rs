// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-based message bus connecting a job server to remote workers.
//!
//! Delivery is competing-consumer: each published message reaches exactly
//! one subscriber of its topic.

mod http;
mod local;

pub use http::HttpBus;
pub use local::LocalBus;

use crate::ClientError;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus request failed: {0}")]
    Client(#[from] ClientError),
    #[error("bus is closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Stream of messages for one topic. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::Receiver<Message>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<Message>) -> Self {
        Self { rx }
    }

    /// Next message; `None` once the bus side has shut down.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;

    fn subscribe(&self, topic: &str) -> Subscription;
}
