// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job storage for the Job Engine.
//!
//! A [`Store`] keeps the primary job records; each local backend also
//! owns a search index that is brought up to date in batches by a
//! [`PeriodicIndexer`].

mod backup;
mod error;
pub mod index;
mod kv;
mod log_store;
mod memory;
mod store;

pub use error::StoreError;
pub use index::{Document, IndexOp, MemoryIndex, PeriodicIndexer, Query, QueryError, SearchIndex};
pub use kv::{KvError, KvLog};
pub use log_store::{LogStore, LOG_INDEX_INTERVAL};
pub use memory::{MemoryStore, MEMORY_INDEX_INTERVAL};
pub use store::{Store, StoreOptions};
