// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::{Clock, FakeClock, Job, WorkerId};

fn job(id: u64, name: &str, args: &[&str]) -> Job {
    let clock = FakeClock::new();
    let mut job = Job::new(name, args.iter().map(|a| a.to_string()).collect(), false, clock.now());
    job.id = JobId(id);
    job
}

fn running(mut job: Job) -> Job {
    let clock = FakeClock::new();
    job.enqueue(clock.now()).unwrap();
    job.start(WorkerId::new("w1"), clock.now()).unwrap();
    job
}

fn index_with(jobs: &[Job]) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    index.apply(jobs.iter().map(|j| IndexOp::Index(Document::from_job(j))).collect());
    index
}

fn search(index: &MemoryIndex, q: &str) -> Vec<u64> {
    index
        .search(&Query::parse(q).unwrap())
        .into_iter()
        .map(JobId::get)
        .collect()
}

fn fixture() -> MemoryIndex {
    index_with(&[
        job(1, "echo", &["hello", "world"]),
        running(job(2, "sleep", &["10"])),
        job(3, "echo", &["goodbye"]),
        running(job(4, "cat", &[])),
    ])
}

#[yare::parameterized(
    bare_term        = { "echo", &[1, 3] },
    field_term       = { "name:sleep", &[2] },
    any_field        = { "hello", &[1] },
    case_insensitive = { "NAME:ECHO", &[1, 3] },
    state            = { "state:running", &[2, 4] },
    should_union     = { "name:cat name:sleep", &[2, 4] },
    must_intersect   = { "+name:echo +args:hello", &[1] },
    must_with_should = { "+state:created name:cat", &[1, 3] },
    must_not         = { "name:echo -args:goodbye", &[1] },
    only_must_not    = { "-name:echo", &[2, 4] },
    multi_token      = { "args:\"hello world\"", &[1] },
    multi_token_miss = { "args:\"hello goodbye\"", &[] },
    prefix           = { "name:ec*", &[1, 3] },
    match_all        = { "*", &[1, 2, 3, 4] },
    by_id            = { "id:3", &[3] },
    unknown_field    = { "color:red", &[] },
)]
fn search_semantics(q: &str, expected: &[u64]) {
    assert_eq!(search(&fixture(), q), expected);
}

#[test]
fn reindex_replaces_old_terms() {
    let mut index = fixture();
    let mut updated = running(job(1, "echo", &["hello"]));
    updated.stop(FakeClock::new().now()).unwrap();
    index.apply(vec![IndexOp::Index(Document::from_job(&updated))]);

    assert_eq!(search(&index, "state:stopped"), vec![1]);
    assert_eq!(search(&index, "state:created"), vec![3]);
    assert_eq!(search(&index, "world"), Vec::<u64>::new());
    assert_eq!(index.doc_count(), 4);
}

#[test]
fn delete_removes_document() {
    let mut index = fixture();
    index.apply(vec![IndexOp::Delete(JobId(1)), IndexOp::Delete(JobId(99))]);

    assert_eq!(search(&index, "echo"), vec![3]);
    assert_eq!(index.doc_count(), 3);
}

#[test]
fn internal_metadata_round_trips() {
    let mut index = MemoryIndex::new();
    index.apply(vec![IndexOp::SetInternal("version".into(), b"1".to_vec())]);
    assert_eq!(index.get_internal("version"), Some(b"1".to_vec()));

    index.apply(vec![IndexOp::DeleteInternal("version".into())]);
    assert_eq!(index.get_internal("version"), None);
}
