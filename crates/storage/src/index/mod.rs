// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-text search over job records.
//!
//! Stores never write to the index directly. They hand [`IndexOp`]s to a
//! [`PeriodicIndexer`], which applies them in one batch per tick.

mod memory;
mod periodic;
mod query;

pub use memory::MemoryIndex;
pub use periodic::PeriodicIndexer;
pub use query::{Clause, Occur, Query, QueryError};

use je_core::{Job, JobId};

/// Field that every token is also indexed under, for unqualified terms.
pub const ALL_FIELD: &str = "_all";

/// The searchable view of one job: `(field, token)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: JobId,
    pub terms: Vec<(String, String)>,
}

impl Document {
    pub fn from_job(job: &Job) -> Self {
        let mut terms = Vec::new();
        let mut add = |field: &str, text: &str| {
            for token in tokenize(text) {
                terms.push((field.to_string(), token));
            }
        };

        add("id", &job.id.to_string());
        add("name", &job.name);
        for arg in &job.args {
            add("args", arg);
        }
        add("interactive", if job.interactive { "true" } else { "false" });
        if let Some(worker) = &job.worker {
            add("worker", worker.as_str());
        }
        add("state", job.state.as_str());
        add("status", &job.status.to_string());

        terms.sort();
        terms.dedup();
        Self { id: job.id, terms }
    }
}

/// One pending change to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOp {
    Index(Document),
    Delete(JobId),
    SetInternal(String, Vec<u8>),
    DeleteInternal(String),
}

/// An index that can apply a batch of changes atomically.
pub trait SearchIndex: Send + Sync + 'static {
    /// Apply every op in order; readers see all of them or none.
    fn apply(&mut self, batch: Vec<IndexOp>);

    /// Matching ids in ascending order.
    fn search(&self, query: &Query) -> Vec<JobId>;

    /// Index metadata written with [`IndexOp::SetInternal`].
    fn get_internal(&self, key: &str) -> Option<Vec<u8>>;

    fn doc_count(&self) -> usize;
}

/// Lowercase alphanumeric runs. `*` is kept so prefix patterns survive
/// query tokenization; documents never contain it.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '*'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use je_core::{Clock, FakeClock, WorkerId};

    #[yare::parameterized(
        words       = { "Hello World", &["hello", "world"] },
        punctuation = { "--name=foo.bar", &["name", "foo", "bar"] },
        path        = { "/usr/bin/env", &["usr", "bin", "env"] },
        empty       = { "  ", &[] },
        prefix      = { "ec*", &["ec*"] },
    )]
    fn tokenize_splits_and_lowercases(input: &str, expected: &[&str]) {
        assert_eq!(tokenize(input), expected);
    }

    #[test]
    fn document_covers_job_fields() {
        let clock = FakeClock::new();
        let mut job = Job::new("Echo", vec!["hello".into(), "World".into()], true, clock.now());
        job.id = JobId(7);
        job.enqueue(clock.now()).unwrap();
        job.start(WorkerId::new("abc"), clock.now()).unwrap();

        let doc = Document::from_job(&job);
        let has = |f: &str, t: &str| doc.terms.contains(&(f.to_string(), t.to_string()));

        assert_eq!(doc.id, JobId(7));
        assert!(has("id", "7"));
        assert!(has("name", "echo"));
        assert!(has("args", "world"));
        assert!(has("interactive", "true"));
        assert!(has("worker", "abc"));
        assert!(has("state", "running"));
        assert!(has("status", "0"));
    }
}
