// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::{Clock, FakeClock};
use je_storage::MemoryStore;

#[tokio::test]
async fn traced_store_passes_calls_through() {
    let store = TracedStore::new(MemoryStore::new());
    let mut job = Job::new("echo", vec!["hi".into()], false, FakeClock::new().now());

    store.save(&mut job).await.unwrap();
    assert!(!job.id.is_unassigned());
    assert_eq!(store.get(job.id).await.unwrap(), job);
    assert_eq!(store.all().await.unwrap(), vec![job.clone()]);

    store.inner().flush_index();
    assert_eq!(store.search("name:echo").await.unwrap(), vec![job]);
}

#[tokio::test]
async fn traced_store_keeps_not_found() {
    let store = TracedStore::new(MemoryStore::new());

    let err = store.get(JobId(12)).await.unwrap_err();
    assert_eq!(err.missing_key(), Some(JobId(12)));

    let err = store.find(&[JobId(3)]).await.unwrap_err();
    assert_eq!(err.missing_key(), Some(JobId(3)));
}

#[test]
fn tracing_metrics_is_a_metrics_sink() {
    let sink: &dyn Metrics = &TracingMetrics;
    sink.incr("server_requests", &[("method", "GET"), ("path", "/search")]);
    sink.observe("job_duration", 0.25, &[("name", "sleep")]);
}
