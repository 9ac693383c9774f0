// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn state() -> PathBuf {
    PathBuf::from("/var/lib/je")
}

#[test]
fn defaults_live_under_state_dir() {
    let config = Config::defaults(state());

    assert_eq!(config.log_path, PathBuf::from("/var/lib/je/jed.log"));
    assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    assert_eq!(config.store, "log:///var/lib/je/je.db");
    assert_eq!(config.data, "file:///var/lib/je/data");
    assert_eq!(config.queue, "local://");
    assert_eq!(config.pool, PoolConfig { workers: 32, backlog: 16 });
    assert_eq!(config.topic, "jobs");
}

#[test]
fn parses_every_section() {
    let text = r#"
[server]
bind = "0.0.0.0:9000"

[storage]
store = "memory://"
data = "file:///tmp/je-data"
queue = "bus://work"

[pool]
workers = 4
backlog = 2

[bus]
topic = "work"
"#;
    let file = FileConfig::parse(text, Path::new("config.toml")).unwrap();
    let config = Config::from_parts(state(), file, &ServeArgs::default()).unwrap();

    assert_eq!(config.bind.to_string(), "0.0.0.0:9000");
    assert_eq!(config.store, "memory://");
    assert_eq!(config.data, "file:///tmp/je-data");
    assert_eq!(config.queue, "bus://work");
    assert_eq!(config.pool, PoolConfig { workers: 4, backlog: 2 });
    assert_eq!(config.topic, "work");
}

#[test]
fn flags_override_file() {
    let file = FileConfig::parse("[pool]\nworkers = 4\nbacklog = 2\n", Path::new("c.toml")).unwrap();
    let args = ServeArgs {
        workers: Some(8),
        store: Some("memory://".into()),
        ..ServeArgs::default()
    };

    let config = Config::from_parts(state(), file, &args).unwrap();

    assert_eq!(config.pool, PoolConfig { workers: 8, backlog: 2 });
    assert_eq!(config.store, "memory://");
}

#[parameterized(
    unknown_section = { "[cache]\nsize = 1\n" },
    unknown_key = { "[pool]\nthreads = 1\n" },
    wrong_type = { "[pool]\nworkers = \"many\"\n" },
    not_toml = { "workers = [" },
)]
fn rejects_invalid_files(text: &str) {
    let err = FileConfig::parse(text, Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn rejects_bad_bind() {
    let args = ServeArgs {
        bind: Some("localhost".into()),
        ..ServeArgs::default()
    };
    let err = Config::from_parts(state(), FileConfig::default(), &args).unwrap_err();
    assert!(matches!(err, ConfigError::Bind(addr) if addr == "localhost"));
}

#[test]
fn missing_default_file_is_empty_but_explicit_file_is_required() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    assert_eq!(FileConfig::read(&path, false).unwrap(), FileConfig::default());
    assert!(matches!(FileConfig::read(&path, true), Err(ConfigError::Read { .. })));
}
