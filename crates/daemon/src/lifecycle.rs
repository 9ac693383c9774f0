// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: build the backends, serve, shut down.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use je_adapters::{ClientError, LocalBus, TracedStore, TracingMetrics};
use je_core::Metrics;
use je_engine::TaskDeps;
use je_storage::{LogStore, Store};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::factory::{self, DataUri, FactoryError, OpenQueue, OpenStore, QueueUri, StoreUri};
use crate::server::{self, AppState};

/// Lower bound on the compaction check period.
const MIN_COMPACT_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured server that has not started listening yet.
pub struct Daemon {
    state: AppState,
    store: Arc<dyn Store>,
    log: Option<Arc<TracedStore<LogStore>>>,
    compact_interval: Duration,
}

impl Daemon {
    /// Open the store, data channel and queue named by `config`. Must be
    /// called inside a tokio runtime.
    pub fn start(config: &Config) -> Result<Self, LifecycleError> {
        Self::with_metrics(config, Arc::new(TracingMetrics))
    }

    pub fn with_metrics(config: &Config, metrics: Arc<dyn Metrics>) -> Result<Self, LifecycleError> {
        let store_uri: StoreUri = config.store.parse()?;
        let data_uri: DataUri = config.data.parse()?;
        let queue_uri: QueueUri = config.queue.parse()?;

        let OpenStore { store, log } =
            factory::open_store(&store_uri, config.index_interval, metrics.clone())?;
        let data = factory::open_data(&data_uri, config.tail_poll)?;
        let bus = LocalBus::new();
        let OpenQueue { queue, pool } =
            factory::open_queue(&queue_uri, &config.topic, config.pool, &bus, metrics.clone())?;

        info!(
            store = %config.store,
            data = %config.data,
            queue = %config.queue,
            workers = pool.as_ref().map_or(0, |p| p.size()),
            "daemon started",
        );

        Ok(Self {
            state: AppState {
                deps: TaskDeps::new(store.clone(), data).with_metrics(metrics),
                queue,
                pool,
                bus,
            },
            store,
            log,
            compact_interval: config.compact_interval,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    pub async fn bind(addr: SocketAddr) -> Result<TcpListener, LifecycleError> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| LifecycleError::Bind { addr, source })
    }

    /// Serve until `shutdown` resolves, then stop taking jobs, let the
    /// workers finish what they are running and close the store.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let compaction = self
            .log
            .clone()
            .map(|log| spawn_compaction(log, self.compact_interval, cancel.clone()));

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(LifecycleError::Serve);
        info!("server stopped, draining");

        cancel.cancel();
        if let Some(handle) = compaction {
            if let Err(e) = handle.await {
                warn!(error = %e, "compaction task panicked");
            }
        }
        self.state.queue.close();
        if let Some(pool) = &self.state.pool {
            pool.wait().await;
        }
        if let Err(e) = self.store.close().await {
            warn!(error = %e, "failed to close store");
        }
        info!("daemon stopped");
        served
    }

    /// Serve in the background until the handle is shut down.
    pub fn spawn(self, listener: TcpListener) -> Result<ServerHandle, LifecycleError> {
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let join = tokio::spawn(self.run(listener, async move {
            let _ = rx.await;
        }));
        Ok(ServerHandle {
            addr,
            shutdown: tx,
            join,
        })
    }
}

/// A server started with [`Daemon::spawn`].
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<Result<(), LifecycleError>>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        let _ = self.shutdown.send(());
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(LifecycleError::Io(std::io::Error::other(e))),
        }
    }
}

/// Periodically compact the embedded log when stale records outnumber
/// live ones.
fn spawn_compaction(
    log: Arc<TracedStore<LogStore>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(MIN_COMPACT_INTERVAL));
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let store = log.clone();
            match tokio::task::spawn_blocking(move || store.inner().compact_if_needed()).await {
                Ok(Ok(true)) => info!(path = %log.inner().path().display(), "compacted job store"),
                Ok(Ok(false)) => {}
                Ok(Err(e)) => warn!(error = %e, "job store compaction failed"),
                Err(e) => warn!(error = %e, "compaction task panicked"),
            }
        }
    })
}

/// Resolves on SIGTERM or SIGINT.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
    })
}
