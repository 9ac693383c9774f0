// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend selection by URI scheme.
//!
//! Only this module names concrete store, data and queue types; the
//! server and engine see the trait objects.

use je_adapters::{Client, ClientError, Data, HttpBus, LocalBus, LocalData, RemoteData, RemoteStore, TracedStore};
use je_core::Metrics;
use je_engine::{BusQueue, Pool, PoolConfig, Queue};
use je_storage::{LogStore, MemoryStore, Store, StoreError, StoreOptions, LOG_INDEX_INTERVAL, MEMORY_INDEX_INTERVAL};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unsupported {kind} uri {uri:?}")]
    Unsupported { kind: &'static str, uri: String },
    #[error("{kind} uri {uri:?} is missing a path")]
    MissingPath { kind: &'static str, uri: String },
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUri {
    Memory,
    /// Embedded KV log (`log://` or `bolt://`).
    Log(PathBuf),
    /// Another server's HTTP API.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUri {
    File(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueUri {
    /// In-process worker pool.
    Local,
    /// This server's own bus, drained by `jed worker` processes.
    Bus { topic: Option<String> },
    /// A bus served over HTTP elsewhere.
    External { server: String, topic: Option<String> },
}

fn split(uri: &str) -> Option<(&str, &str)> {
    uri.split_once("://")
}

/// `je+http://host` -> `http://host`
fn remote_base(scheme: &str, rest: &str) -> Option<String> {
    match scheme {
        "je+http" => Some(format!("http://{rest}")),
        "je+https" => Some(format!("https://{rest}")),
        _ => None,
    }
}

fn path(kind: &'static str, uri: &str, rest: &str) -> Result<PathBuf, FactoryError> {
    if rest.is_empty() {
        return Err(FactoryError::MissingPath {
            kind,
            uri: uri.to_string(),
        });
    }
    Ok(PathBuf::from(rest))
}

fn topic(path: &str) -> Option<String> {
    let topic = path.trim_matches('/');
    (!topic.is_empty()).then(|| topic.to_string())
}

impl FromStr for StoreUri {
    type Err = FactoryError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let unsupported = || FactoryError::Unsupported {
            kind: "store",
            uri: uri.to_string(),
        };
        let (scheme, rest) = split(uri).ok_or_else(unsupported)?;
        match scheme {
            "memory" => Ok(StoreUri::Memory),
            "log" | "bolt" => Ok(StoreUri::Log(path("store", uri, rest)?)),
            _ => remote_base(scheme, rest).map(StoreUri::Remote).ok_or_else(unsupported),
        }
    }
}

impl FromStr for DataUri {
    type Err = FactoryError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let unsupported = || FactoryError::Unsupported {
            kind: "data",
            uri: uri.to_string(),
        };
        let (scheme, rest) = split(uri).ok_or_else(unsupported)?;
        match scheme {
            "file" => Ok(DataUri::File(path("data", uri, rest)?)),
            _ => remote_base(scheme, rest).map(DataUri::Remote).ok_or_else(unsupported),
        }
    }
}

impl FromStr for QueueUri {
    type Err = FactoryError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let unsupported = || FactoryError::Unsupported {
            kind: "queue",
            uri: uri.to_string(),
        };
        let (scheme, rest) = split(uri).ok_or_else(unsupported)?;
        let http = match scheme {
            "local" => return Ok(QueueUri::Local),
            "bus" => return Ok(QueueUri::Bus { topic: topic(rest) }),
            "msgbus+http" => "http",
            "msgbus+https" => "https",
            _ => return Err(unsupported()),
        };
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        if host.is_empty() {
            return Err(FactoryError::MissingPath {
                kind: "queue",
                uri: uri.to_string(),
            });
        }
        Ok(QueueUri::External {
            server: format!("{http}://{host}"),
            topic: topic(path),
        })
    }
}

/// An opened store. `log` is set for the embedded log so the daemon can
/// compact it.
pub struct OpenStore {
    pub store: Arc<dyn Store>,
    pub log: Option<Arc<TracedStore<LogStore>>>,
}

pub fn open_store(
    uri: &StoreUri,
    index_interval: Option<Duration>,
    metrics: Arc<dyn Metrics>,
) -> Result<OpenStore, FactoryError> {
    let opened = match uri {
        StoreUri::Memory => {
            let options = StoreOptions::with_interval(index_interval.unwrap_or(MEMORY_INDEX_INTERVAL))
                .metrics(metrics);
            OpenStore {
                store: Arc::new(TracedStore::new(MemoryStore::with_options(options))),
                log: None,
            }
        }
        StoreUri::Log(path) => {
            let options = StoreOptions::with_interval(index_interval.unwrap_or(LOG_INDEX_INTERVAL))
                .metrics(metrics);
            let log = Arc::new(TracedStore::new(LogStore::open_with(path, options)?));
            OpenStore {
                store: log.clone(),
                log: Some(log),
            }
        }
        StoreUri::Remote(base) => OpenStore {
            store: Arc::new(TracedStore::new(RemoteStore::new(Client::new(base)?))),
            log: None,
        },
    };
    info!(store = ?uri, "store ready");
    Ok(opened)
}

pub fn open_data(uri: &DataUri, tail_poll: Duration) -> Result<Arc<dyn Data>, FactoryError> {
    Ok(match uri {
        DataUri::File(root) => Arc::new(LocalData::new(root).with_poll_interval(tail_poll)),
        DataUri::Remote(base) => Arc::new(RemoteData::new(Client::new(base)?)),
    })
}

/// Where submitted tasks go. A local queue also yields the pool that
/// runs them.
pub struct OpenQueue {
    pub queue: Arc<dyn Queue>,
    pub pool: Option<Pool>,
}

pub fn open_queue(
    uri: &QueueUri,
    default_topic: &str,
    pool: PoolConfig,
    bus: &LocalBus,
    metrics: Arc<dyn Metrics>,
) -> Result<OpenQueue, FactoryError> {
    let opened = match uri {
        QueueUri::Local => {
            let pool = Pool::with_metrics(pool, metrics);
            OpenQueue {
                queue: Arc::new(pool.clone()),
                pool: Some(pool),
            }
        }
        QueueUri::Bus { topic } => OpenQueue {
            queue: Arc::new(BusQueue::new(
                Arc::new(bus.clone()),
                topic.as_deref().unwrap_or(default_topic),
            )),
            pool: None,
        },
        QueueUri::External { server, topic } => OpenQueue {
            queue: Arc::new(BusQueue::new(
                Arc::new(HttpBus::new(Client::new(server)?)),
                topic.as_deref().unwrap_or(default_topic),
            )),
            pool: None,
        },
    };
    info!(queue = ?uri, "queue ready");
    Ok(opened)
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
