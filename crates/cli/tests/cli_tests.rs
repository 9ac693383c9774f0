// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs the `je` binary against an in-process server.

use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use je_core::{Job, JobState, NoOpMetrics};
use je_daemon::{Config, Daemon, ServerHandle};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Test Infrastructure
// ---------------------------------------------------------------------------

struct TestServer {
    handle: ServerHandle,
    dir: TempDir,
}

async fn start() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::defaults(dir.path().to_path_buf());
    config.store = "memory://".to_string();
    config.pool.workers = 2;
    config.tail_poll = Duration::from_millis(10);

    let daemon = Daemon::with_metrics(&config, Arc::new(NoOpMetrics)).unwrap();
    let listener = Daemon::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let handle = daemon.spawn(listener).unwrap();
    TestServer { handle, dir }
}

impl TestServer {
    async fn je(&self, args: &[&str]) -> Output {
        self.je_with_input(args, b"").await
    }

    async fn je_with_input(&self, args: &[&str], input: &[u8]) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_je"))
            .args(args)
            .env("JE_SERVER", self.handle.url())
            .env("JE_WAIT_POLL_MS", "20")
            .env("NO_COLOR", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input).await.unwrap();
        drop(stdin);
        tokio::time::timeout(TIMEOUT, child.wait_with_output())
            .await
            .unwrap()
            .unwrap()
    }

    /// `je run` without waiting; returns the printed id.
    async fn submit(&self, args: &[&str]) -> String {
        let mut argv = vec!["run"];
        argv.extend_from_slice(args);
        let out = self.je(&argv).await;
        assert!(out.status.success(), "{}", stderr(&out));
        stdout(&out).trim().to_string()
    }

    async fn stop(self) {
        self.handle.shutdown().await.unwrap();
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// run / wait
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn run_wait_prints_output() {
    let server = start().await;

    let out = server.je(&["run", "-w", "echo", "hello", "world"]).await;

    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "hello world\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn run_wait_exits_with_job_status() {
    let server = start().await;

    let out = server.je(&["run", "-w", "sh", "-c", "exit 3"]).await;

    assert_eq!(out.status.code(), Some(3));
    assert_eq!(stderr(&out), "");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn run_forwards_piped_stdin() {
    let server = start().await;

    let out = server.je_with_input(&["run", "-w", "cat"], b"piped\n").await;

    assert_eq!(stdout(&out), "piped\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn run_reads_input_file() {
    let server = start().await;
    let path = server.dir.path().join("input.txt");
    std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

    let out = server
        .je(&["run", "-w", "--input", path.to_str().unwrap(), "wc", "-l"])
        .await;

    assert_eq!(stdout(&out).trim(), "3");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn wait_reports_final_state() {
    let server = start().await;
    let id = server.submit(&["sh", "-c", "sleep 0.2; exit 4"]).await;

    let out = server.je(&["wait", &id]).await;

    assert_eq!(out.status.code(), Some(4));
    assert_eq!(stdout(&out), "STOPPED 4\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn wait_times_out_with_code_2() {
    let server = start().await;
    let id = server.submit(&["sleep", "1"]).await;

    let out = server.je(&["wait", &id, "--timeout", "0"]).await;

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("timed out"));
    server.stop().await;
}

// ---------------------------------------------------------------------------
// ps / show / kill
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn ps_json_lists_all_jobs() {
    let server = start().await;
    server.je(&["run", "-w", "true"]).await;
    server.je(&["run", "-w", "false"]).await;

    let out = server.je(&["ps", "-a", "-o", "json"]).await;

    let jobs: Vec<Job> = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["true", "false"]);
    assert!(jobs.iter().all(|j| j.state == JobState::Stopped));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn ps_defaults_to_running_jobs() {
    let server = start().await;
    server.je(&["run", "-w", "true"]).await;
    let id = server.submit(&["sleep", "1"]).await;

    let out = server.je(&["ps", "-q"]).await;
    // the sleeper may still be WAITING on a slow machine
    let listed = stdout(&out);
    assert!(listed.is_empty() || listed == format!("{id}\n"), "{listed}");

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn show_unknown_job_fails() {
    let server = start().await;

    let out = server.je(&["show", "99"]).await;

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("Error: not found"), "{}", stderr(&out));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn kill_stops_running_job() {
    let server = start().await;
    let id = server.submit(&["sleep", "30"]).await;
    // kill only applies once a worker has started the job
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        let out = server.je(&["show", "-o", "json", &id]).await;
        let job: Job = serde_json::from_slice(&out.stdout).unwrap();
        if job.state == JobState::Running {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let out = server.je(&["kill", "--force", &id]).await;
    assert!(out.status.success(), "{}", stderr(&out));

    let out = server.je(&["wait", &id]).await;
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "KILLED -1\n");
    server.stop().await;
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn logs_shows_stderr() {
    let server = start().await;
    let id = server.submit(&["sh", "-c", "echo oops >&2"]).await;
    server.je(&["wait", &id]).await;

    let out = server.je(&["logs", &id]).await;

    assert_eq!(stdout(&out), "oops\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_write_close_output() {
    let server = start().await;
    let id = server.submit(&["-i", "cat"]).await;

    let out = server.je_with_input(&["write", &id], b"first\n").await;
    assert!(out.status.success(), "{}", stderr(&out));
    let path = server.dir.path().join("more.txt");
    std::fs::write(&path, "second\n").unwrap();
    server.je(&["write", &id, path.to_str().unwrap()]).await;
    server.je(&["close", &id]).await;

    let out = server.je(&["wait", &id]).await;
    assert!(out.status.success(), "{}", stderr(&out));
    let out = server.je(&["output", &id]).await;
    assert_eq!(stdout(&out), "first\nsecond\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn follow_ends_when_job_finishes() {
    let server = start().await;
    let id = server.submit(&["sh", "-c", "echo a; sleep 0.3; echo b"]).await;

    let out = server.je(&["output", "-f", &id]).await;

    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "a\nb\n");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn version_names_the_server() {
    let server = start().await;

    let out = server.je(&["version"]).await;

    assert!(stdout(&out).starts_with("Job Engine "));
    server.stop().await;
}
