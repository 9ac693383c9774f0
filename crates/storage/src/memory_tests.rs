// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::{Clock, FakeClock, JobState, WorkerId};

fn new_job(name: &str) -> Job {
    Job::new(name, vec!["x".to_string()], false, FakeClock::new().now())
}

#[tokio::test]
async fn save_assigns_increasing_ids() {
    let store = MemoryStore::new();
    let mut a = new_job("a");
    let mut b = new_job("b");
    store.save(&mut a).await.unwrap();
    store.save(&mut b).await.unwrap();

    assert_eq!(a.id, JobId(1));
    assert_eq!(b.id, JobId(2));
    assert_eq!(store.next_id(), JobId(3));
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let clock = FakeClock::new();
    let store = MemoryStore::new();
    let mut job = new_job("echo");
    job.id = store.next_id();
    job.enqueue(clock.now()).unwrap();
    job.start(WorkerId::new("w"), clock.now()).unwrap();
    store.save(&mut job).await.unwrap();

    assert_eq!(store.get(job.id).await.unwrap(), job);
}

#[tokio::test]
async fn save_with_external_id_bumps_counter() {
    let store = MemoryStore::new();
    let mut job = new_job("remote");
    job.id = JobId(40);
    store.save(&mut job).await.unwrap();

    let mut next = new_job("local");
    store.save(&mut next).await.unwrap();
    assert_eq!(next.id, JobId(41));
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let store = MemoryStore::new();
    let err = store.get(JobId(9)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.missing_key(), Some(JobId(9)));
    assert_eq!(err.to_string(), "key does not exist: 9");
}

#[tokio::test]
async fn find_fails_on_first_missing() {
    let store = MemoryStore::new();
    let mut job = new_job("a");
    store.save(&mut job).await.unwrap();

    let found = store.find(&[job.id]).await.unwrap();
    assert_eq!(found.len(), 1);

    let err = store.find(&[job.id, JobId(5), JobId(6)]).await.unwrap_err();
    assert_eq!(err.missing_key(), Some(JobId(5)));
}

#[tokio::test]
async fn all_is_ordered_by_id() {
    let store = MemoryStore::new();
    for id in [3u64, 1, 2] {
        let mut job = new_job("j");
        job.id = JobId(id);
        store.save(&mut job).await.unwrap();
    }
    let ids: Vec<u64> = store.all().await.unwrap().iter().map(|j| j.id.get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn search_sees_saves_after_flush() {
    let store = MemoryStore::new();
    let mut job = new_job("sleep");
    store.save(&mut job).await.unwrap();

    store.flush_index();
    let jobs = store.search("name:sleep").await.unwrap();
    assert_eq!(jobs, vec![job.clone()]);

    // Updated state becomes searchable once flushed again
    job.enqueue(FakeClock::new().now()).unwrap();
    store.save(&mut job).await.unwrap();
    store.flush_index();
    let jobs = store.search("+state:waiting").await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].state, JobState::Waiting);
}

#[tokio::test]
async fn search_converges_within_interval() {
    let store = MemoryStore::with_options(StoreOptions::with_interval(Duration::from_millis(10)));
    let mut job = new_job("cat");
    store.save(&mut job).await.unwrap();

    let mut found = false;
    for _ in 0..100 {
        if !store.search("cat").await.unwrap().is_empty() {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(found);
}

#[tokio::test]
async fn search_rejects_empty_query() {
    let store = MemoryStore::new();
    assert!(matches!(store.search("").await, Err(StoreError::Query(_))));
}

#[tokio::test]
async fn closed_store_rejects_saves() {
    let store = MemoryStore::new();
    store.close().await.unwrap();
    let mut job = new_job("late");
    assert!(matches!(store.save(&mut job).await, Err(StoreError::Closed)));
}
