// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling loop for `je wait`: fixed interval, optional deadline, Ctrl+C.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

pub enum Tick {
    Ready,
    Timeout,
    Interrupted,
}

pub struct Poller {
    interval: Duration,
    deadline: Option<Instant>,
    ctrl_c: Pin<Box<dyn Future<Output = std::io::Result<()>>>>,
}

impl Poller {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            interval,
            deadline: timeout.map(|t| Instant::now() + t),
            ctrl_c: Box::pin(tokio::signal::ctrl_c()),
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Sleep one interval. The deadline is checked before and after the
    /// sleep.
    pub async fn tick(&mut self) -> Tick {
        if self.expired() {
            return Tick::Timeout;
        }
        tokio::select! {
            _ = &mut self.ctrl_c => Tick::Interrupted,
            _ = tokio::time::sleep(self.interval) => {
                if self.expired() {
                    Tick::Timeout
                } else {
                    Tick::Ready
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
