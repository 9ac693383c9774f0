// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the HTTP client, remote proxies, per-job
//! data streams and the message bus.

pub mod bus;
pub mod client;
pub mod data;
mod remote_store;
pub mod traced;

pub use bus::{BusError, HttpBus, LocalBus, Message, MessageBus, Subscription};
pub use client::{Client, ClientError, CreateRequest, ErrorBody, SearchFilter, WorkerInfo};
pub use data::{
    Data, DataError, DataReader, DataWriter, LocalData, RemoteData, Tail, DEFAULT_TAIL_POLL,
};
pub use remote_store::RemoteStore;
pub use traced::{TracedStore, TracingMetrics};
