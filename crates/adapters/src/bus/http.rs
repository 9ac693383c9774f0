// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{BusError, Message, MessageBus, Subscription};
use crate::Client;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Delay between polls of an empty topic.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Delay after a failed poll.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Bus served by a job server's `/bus/{topic}` routes.
#[derive(Clone)]
pub struct HttpBus {
    client: Client,
    poll_interval: Duration,
}

impl HttpBus {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl MessageBus for HttpBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.client.publish(topic, payload).await?;
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let bus = self.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            while let Ok(permit) = tx.reserve().await {
                let delay = match bus.client.poll(&topic).await {
                    Ok(Some(payload)) => {
                        permit.send(Message {
                            topic: topic.clone(),
                            payload,
                        });
                        continue;
                    }
                    Ok(None) => bus.poll_interval,
                    Err(e) => {
                        tracing::warn!(topic = %topic, error = %e, "bus poll failed");
                        ERROR_BACKOFF
                    }
                };
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            tracing::debug!(topic = %topic, "bus subscription closed");
        });
        Subscription::new(rx)
    }
}
