// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jed worker`: run jobs for a remote server.
//!
//! The pool records state through the server's `/update` route, streams
//! data through `/write` and `/read`, and takes jobs from a bus topic.

use std::future::Future;
use std::sync::Arc;

use je_adapters::{Client, HttpBus, RemoteData, RemoteStore, TracedStore, TracingMetrics};
use je_core::Metrics;
use je_engine::{Boss, Pool, PoolConfig, TaskDeps, DEFAULT_BACKLOG, DEFAULT_WORKERS};
use tracing::info;

use crate::config::DEFAULT_TOPIC;
use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone, clap::Args)]
pub struct WorkerArgs {
    /// Job server to report to
    #[arg(long, env = "JE_SERVER", default_value = "http://127.0.0.1:8000")]
    pub server: String,
    /// Bus endpoint (default: the job server)
    #[arg(long)]
    pub bus: Option<String>,
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
    #[arg(long, default_value_t = DEFAULT_BACKLOG)]
    pub backlog: usize,
}

/// A running worker process.
pub struct RemoteWorker {
    boss: Boss,
}

impl RemoteWorker {
    pub fn start(args: &WorkerArgs) -> Result<Self, LifecycleError> {
        Self::with_metrics(args, Arc::new(TracingMetrics))
    }

    pub fn with_metrics(args: &WorkerArgs, metrics: Arc<dyn Metrics>) -> Result<Self, LifecycleError> {
        let server = Client::new(&args.server)?;
        let bus = match &args.bus {
            Some(url) => Client::new(url)?,
            None => server.clone(),
        };

        let deps = TaskDeps::new(
            Arc::new(TracedStore::new(RemoteStore::new(server.clone()))),
            Arc::new(RemoteData::new(server)),
        )
        .with_metrics(metrics.clone());
        let pool = Pool::with_metrics(
            PoolConfig {
                workers: args.workers,
                backlog: args.backlog,
            },
            metrics,
        );
        let boss = Boss::start(pool, &HttpBus::new(bus), &args.topic, deps);
        info!(server = %args.server, topic = %args.topic, workers = args.workers, "worker started");
        Ok(Self { boss })
    }

    pub fn pool(&self) -> &Pool {
        self.boss.pool()
    }

    /// Stop taking jobs and wait for running ones to finish.
    pub async fn shutdown(self) {
        self.boss.shutdown().await;
        info!("worker stopped");
    }

    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) {
        shutdown.await;
        self.shutdown().await;
    }
}
