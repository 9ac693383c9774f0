// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Precedence: command-line flags, then the TOML file, then defaults.
//! Interval overrides come from the environment (see [`crate::env`]).

use je_adapters::DEFAULT_TAIL_POLL;
use je_engine::PoolConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::env;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_TOPIC: &str = "jobs";
/// How often the log store is checked for compaction.
pub const DEFAULT_COMPACT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory (set JE_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid bind address {0:?}")]
    Bind(String),
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub pool: PoolSection,
    pub bus: BusSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub store: Option<String>,
    pub data: Option<String>,
    pub queue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSection {
    pub workers: Option<usize>,
    pub backlog: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusSection {
    pub topic: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Read `path`. A missing file is only an error when `required`.
    pub fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            }),
        }
    }
}

/// Flags shared by `jed serve`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ServeArgs {
    /// Config file (default: $STATE_DIR/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Listen address
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
    /// Store URI: memory://, log://PATH or je+http://HOST
    #[arg(long, value_name = "URI")]
    pub store: Option<String>,
    /// Data URI: file://PATH or je+http://HOST
    #[arg(long, value_name = "URI")]
    pub data: Option<String>,
    /// Queue URI: local://, bus://[TOPIC] or msgbus+http://HOST[/TOPIC]
    #[arg(long, value_name = "URI")]
    pub queue: Option<String>,
    /// Worker count for a local queue
    #[arg(long)]
    pub workers: Option<usize>,
    /// Dispatch queue capacity
    #[arg(long)]
    pub backlog: Option<usize>,
    /// Bus topic
    #[arg(long)]
    pub topic: Option<String>,
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub log_path: PathBuf,
    pub bind: SocketAddr,
    pub store: String,
    pub data: String,
    pub queue: String,
    pub pool: PoolConfig,
    pub topic: String,
    /// `None` keeps each store's own flush interval.
    pub index_interval: Option<Duration>,
    pub compact_interval: Duration,
    pub tail_poll: Duration,
}

impl Config {
    /// Defaults rooted at `state_dir`.
    pub fn defaults(state_dir: PathBuf) -> Self {
        Self {
            log_path: state_dir.join("jed.log"),
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            store: format!("log://{}", state_dir.join("je.db").display()),
            data: format!("file://{}", state_dir.join("data").display()),
            queue: "local://".to_string(),
            pool: PoolConfig::default(),
            topic: DEFAULT_TOPIC.to_string(),
            index_interval: None,
            compact_interval: DEFAULT_COMPACT_INTERVAL,
            tail_poll: DEFAULT_TAIL_POLL,
            state_dir,
        }
    }

    /// Resolve from the environment, the config file and `args`.
    pub fn load(args: &ServeArgs) -> Result<Self, ConfigError> {
        let state_dir = env::state_dir()?;
        let file = match &args.config {
            Some(path) => FileConfig::read(path, true)?,
            None => FileConfig::read(&state_dir.join("config.toml"), false)?,
        };
        let mut config = Self::from_parts(state_dir, file, args)?;
        config.index_interval = env::index_interval().or(config.index_interval);
        if let Some(interval) = env::compact_interval() {
            config.compact_interval = interval;
        }
        if let Some(poll) = env::tail_poll() {
            config.tail_poll = poll;
        }
        Ok(config)
    }

    /// Layer `file` and then `args` over the defaults.
    pub fn from_parts(
        state_dir: PathBuf,
        file: FileConfig,
        args: &ServeArgs,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::defaults(state_dir);

        let bind = args.bind.clone().or(file.server.bind);
        if let Some(bind) = bind {
            config.bind = bind.parse().map_err(|_| ConfigError::Bind(bind))?;
        }
        if let Some(store) = args.store.clone().or(file.storage.store) {
            config.store = store;
        }
        if let Some(data) = args.data.clone().or(file.storage.data) {
            config.data = data;
        }
        if let Some(queue) = args.queue.clone().or(file.storage.queue) {
            config.queue = queue;
        }
        if let Some(workers) = args.workers.or(file.pool.workers) {
            config.pool.workers = workers;
        }
        if let Some(backlog) = args.backlog.or(file.pool.backlog) {
            config.pool.backlog = backlog;
        }
        if let Some(topic) = args.topic.clone().or(file.bus.topic) {
            config.topic = topic;
        }
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
