// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Engine daemon library
//!
//! Configuration, backend selection and the HTTP server behind `jed`.
//! Exposed as a library so tests and the `je` client can run a server
//! in-process.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod factory;
pub mod lifecycle;
pub mod logging;
pub mod server;
pub mod worker;

pub use config::{Config, ConfigError, ServeArgs};
pub use lifecycle::{shutdown_signal, Daemon, LifecycleError, ServerHandle};
pub use server::{ApiError, AppState};
pub use worker::{RemoteWorker, WorkerArgs};
