// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! je-core: job records, identifiers and the lifecycle state machine
//! shared by every Job Engine crate.

pub mod clock;
pub mod data;
pub mod id;
pub mod job;
pub mod metrics;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use data::{DataKind, ParseDataKindError};
pub use id::{JobId, ParseJobIdError};
pub use job::{Job, JobState, ParseJobStateError, TransitionError};
pub use metrics::{Metrics, NoOpMetrics};
pub use worker::WorkerId;

#[cfg(any(test, feature = "test-support"))]
pub use metrics::{FakeMetrics, MetricCall};
