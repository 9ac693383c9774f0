// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job Engine execution: live tasks, dispatch queues, the worker pool
//! and the boss that feeds a pool from the message bus.

mod boss;
mod error;
mod pool;
mod queue;
mod task;

pub use boss::Boss;
pub use error::{PoolError, QueueError, TaskError};
pub use pool::{Pool, PoolConfig, Worker, DEFAULT_BACKLOG, DEFAULT_WORKERS};
pub use queue::{BusQueue, ChannelQueue, Queue};
pub use task::{Task, TaskDeps};
