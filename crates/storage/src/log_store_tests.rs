// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::{Clock, FakeClock, WorkerId};
use tempfile::tempdir;

fn new_job(name: &str, args: &[&str]) -> Job {
    Job::new(
        name,
        args.iter().map(|a| a.to_string()).collect(),
        false,
        FakeClock::new().now(),
    )
}

#[tokio::test]
async fn save_assigns_ids_from_sequence() {
    let dir = tempdir().unwrap();
    let store = LogStore::open(&dir.path().join("je.db")).unwrap();

    let reserved = store.next_id();
    let mut job = new_job("echo", &["hi"]);
    store.save(&mut job).await.unwrap();

    assert_eq!(reserved, JobId(1));
    assert_eq!(job.id, JobId(2));
}

#[tokio::test]
async fn records_survive_reopen_and_are_reindexed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("je.db");
    let clock = FakeClock::new();

    let saved = {
        let store = LogStore::open(&path).unwrap();
        let mut job = new_job("sleep", &["5"]);
        store.save(&mut job).await.unwrap();
        job.enqueue(clock.now()).unwrap();
        job.start(WorkerId::new("w1"), clock.now()).unwrap();
        store.save(&mut job).await.unwrap();
        store.close().await.unwrap();
        job
    };

    let store = LogStore::open(&path).unwrap();
    assert_eq!(store.get(saved.id).await.unwrap(), saved);
    assert_eq!(store.all().await.unwrap(), vec![saved.clone()]);
    assert_eq!(store.search("state:running").await.unwrap(), vec![saved]);

    let mut next = new_job("next", &[]);
    store.save(&mut next).await.unwrap();
    assert_eq!(next.id, JobId(2));
}

#[tokio::test]
async fn save_with_external_id_bumps_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("je.db");
    let store = LogStore::open(&path).unwrap();

    let mut remote = new_job("remote", &[]);
    remote.id = JobId(2);
    store.save(&mut remote).await.unwrap();

    let mut a = new_job("a", &[]);
    let mut b = new_job("b", &[]);
    store.save(&mut a).await.unwrap();
    store.save(&mut b).await.unwrap();
    assert_eq!((a.id, b.id), (JobId(3), JobId(4)));
    assert_eq!(store.get(JobId(2)).await.unwrap().name, "remote");
    store.close().await.unwrap();

    let store = LogStore::open(&path).unwrap();
    assert_eq!(store.next_id(), JobId(5));
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = LogStore::open(&dir.path().join("je.db")).unwrap();

    let err = store.get(JobId(77)).await.unwrap_err();
    assert_eq!(err.missing_key(), Some(JobId(77)));
}

#[tokio::test]
async fn find_is_fail_fast() {
    let dir = tempdir().unwrap();
    let store = LogStore::open(&dir.path().join("je.db")).unwrap();
    let mut a = new_job("a", &[]);
    let mut b = new_job("b", &[]);
    store.save(&mut a).await.unwrap();
    store.save(&mut b).await.unwrap();

    let jobs = store.find(&[b.id, a.id]).await.unwrap();
    assert_eq!(jobs, vec![b.clone(), a.clone()]);

    let err = store.find(&[a.id, JobId(10)]).await.unwrap_err();
    assert_eq!(err.missing_key(), Some(JobId(10)));
}

#[tokio::test]
async fn search_finds_new_job_after_flush() {
    let dir = tempdir().unwrap();
    let store = LogStore::open(&dir.path().join("je.db")).unwrap();
    let mut job = new_job("grep", &["pattern"]);
    store.save(&mut job).await.unwrap();

    store.flush_index();
    assert_eq!(store.search("args:pattern").await.unwrap(), vec![job]);
}

#[tokio::test]
async fn compaction_keeps_latest_records() {
    let dir = tempdir().unwrap();
    let store = LogStore::open(&dir.path().join("je.db")).unwrap();
    let clock = FakeClock::new();
    let mut job = new_job("loop", &[]);
    store.save(&mut job).await.unwrap();
    job.enqueue(clock.now()).unwrap();
    store.save(&mut job).await.unwrap();

    assert!(store.compact_if_needed().unwrap());
    assert!(!store.compact_if_needed().unwrap());
    assert_eq!(store.get(job.id).await.unwrap(), job);
}

#[tokio::test]
async fn second_open_fails_while_locked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("je.db");
    let _store = LogStore::open(&path).unwrap();

    assert!(matches!(LogStore::open(&path), Err(StoreError::Kv(crate::KvError::Locked(_)))));
}
