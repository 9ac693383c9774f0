// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn write_all(data: &LocalData, id: JobId, kind: DataKind, bytes: &[u8]) {
    let mut w = data.write(id, kind).await.unwrap();
    w.write_all(bytes).await.unwrap();
    w.shutdown().await.unwrap();
}

async fn read_all(data: &LocalData, id: JobId, kind: DataKind) -> String {
    let mut r = data.read(id, kind).await.unwrap();
    let mut out = String::new();
    r.read_to_string(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn streams_are_files_per_kind() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path().join("data"));

    write_all(&data, JobId(4), DataKind::Output, b"hi\n").await;

    assert!(dir.path().join("data/4.out").exists());
    assert_eq!(read_all(&data, JobId(4), DataKind::Output).await, "hi\n");
}

#[tokio::test]
async fn output_appends_and_input_truncates() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path());

    write_all(&data, JobId(1), DataKind::Logs, b"one\n").await;
    write_all(&data, JobId(1), DataKind::Logs, b"two\n").await;
    write_all(&data, JobId(1), DataKind::Input, b"first input").await;
    write_all(&data, JobId(1), DataKind::Input, b"x").await;

    assert_eq!(read_all(&data, JobId(1), DataKind::Logs).await, "one\ntwo\n");
    assert_eq!(read_all(&data, JobId(1), DataKind::Input).await, "x");
}

#[tokio::test]
async fn read_missing_stream_is_not_found() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path());

    let err = data.read(JobId(9), DataKind::Input).await.err().unwrap();
    assert!(err.is_not_found());
    assert!(matches!(err, DataError::NotFound { id: JobId(9), kind: DataKind::Input }));
}

#[tokio::test]
async fn tail_follows_appended_lines() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path()).with_poll_interval(Duration::from_millis(5));
    let cancel = CancellationToken::new();

    // Tail starts before the file exists
    let mut tail = data.tail(JobId(2), DataKind::Output, cancel.clone());

    let mut w = data.write(JobId(2), DataKind::Output).await.unwrap();
    w.write_all(b"alpha\nbe").await.unwrap();
    w.flush().await.unwrap();
    assert_eq!(tail.next_line().await.unwrap().as_deref(), Some("alpha"));

    w.write_all(b"ta\ngamma\n").await.unwrap();
    w.flush().await.unwrap();
    assert_eq!(tail.next_line().await.unwrap().as_deref(), Some("beta"));
    assert_eq!(tail.next_line().await.unwrap().as_deref(), Some("gamma"));

    cancel.cancel();
    assert_eq!(tail.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn tail_reads_existing_content_first() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path()).with_poll_interval(Duration::from_millis(5));
    write_all(&data, JobId(3), DataKind::Logs, b"a\nb\n").await;

    let cancel = CancellationToken::new();
    let mut tail = data.tail(JobId(3), DataKind::Logs, cancel.clone());

    assert_eq!(tail.next_line().await.unwrap().as_deref(), Some("a"));
    assert_eq!(tail.next_line().await.unwrap().as_deref(), Some("b"));
    cancel.cancel();
}

#[tokio::test]
async fn independent_tails_each_start_from_the_beginning() {
    let dir = tempdir().unwrap();
    let data = LocalData::new(dir.path()).with_poll_interval(Duration::from_millis(5));
    write_all(&data, JobId(5), DataKind::Output, b"only\n").await;

    let cancel = CancellationToken::new();
    let mut first = data.tail(JobId(5), DataKind::Output, cancel.clone());
    let mut second = data.tail(JobId(5), DataKind::Output, cancel.clone());

    assert_eq!(first.next_line().await.unwrap().as_deref(), Some("only"));
    assert_eq!(second.next_line().await.unwrap().as_deref(), Some("only"));
    cancel.cancel();
}
