// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory inverted index.

use super::query::{Clause, Occur, Query};
use super::{Document, IndexOp, SearchIndex, ALL_FIELD};
use je_core::JobId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Postings keyed by field, then token.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    postings: HashMap<String, BTreeMap<String, BTreeSet<JobId>>>,
    /// Terms each document was indexed with, for removal on re-index
    docs: BTreeMap<JobId, Vec<(String, String)>>,
    internal: HashMap<String, Vec<u8>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, doc: Document) {
        self.remove(doc.id);
        for (field, token) in &doc.terms {
            for f in [field.as_str(), ALL_FIELD] {
                self.postings
                    .entry(f.to_string())
                    .or_default()
                    .entry(token.clone())
                    .or_default()
                    .insert(doc.id);
            }
        }
        self.docs.insert(doc.id, doc.terms);
    }

    fn remove(&mut self, id: JobId) {
        let Some(terms) = self.docs.remove(&id) else {
            return;
        };
        for (field, token) in terms {
            for f in [field.as_str(), ALL_FIELD] {
                if let Some(tokens) = self.postings.get_mut(f) {
                    if let Some(ids) = tokens.get_mut(&token) {
                        ids.remove(&id);
                        if ids.is_empty() {
                            tokens.remove(&token);
                        }
                    }
                }
            }
        }
    }

    /// Ids holding `token` in `field`; a trailing `*` matches by prefix.
    fn lookup(&self, field: &str, token: &str) -> BTreeSet<JobId> {
        let Some(tokens) = self.postings.get(field) else {
            return BTreeSet::new();
        };
        match token.strip_suffix('*') {
            Some(prefix) => tokens
                .range(prefix.to_string()..)
                .take_while(|(t, _)| t.starts_with(prefix))
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect(),
            None => tokens.get(token).cloned().unwrap_or_default(),
        }
    }

    fn matches(&self, clause: &Clause) -> BTreeSet<JobId> {
        if clause.is_match_all() {
            return self.docs.keys().copied().collect();
        }
        let mut tokens = clause.tokens.iter();
        let Some(first) = tokens.next() else {
            return BTreeSet::new();
        };
        let mut ids = self.lookup(&clause.field, first);
        for token in tokens {
            let next = self.lookup(&clause.field, token);
            ids.retain(|id| next.contains(id));
        }
        ids
    }
}

impl SearchIndex for MemoryIndex {
    fn apply(&mut self, batch: Vec<IndexOp>) {
        for op in batch {
            match op {
                IndexOp::Index(doc) => self.insert(doc),
                IndexOp::Delete(id) => self.remove(id),
                IndexOp::SetInternal(key, value) => {
                    self.internal.insert(key, value);
                }
                IndexOp::DeleteInternal(key) => {
                    self.internal.remove(&key);
                }
            }
        }
    }

    fn search(&self, query: &Query) -> Vec<JobId> {
        let mut must: Option<BTreeSet<JobId>> = None;
        let mut should: Option<BTreeSet<JobId>> = None;
        let mut excluded = BTreeSet::new();

        for clause in &query.clauses {
            let ids = self.matches(clause);
            match clause.occur {
                Occur::Must => {
                    must = Some(match must {
                        Some(acc) => acc.intersection(&ids).copied().collect(),
                        None => ids,
                    });
                }
                Occur::Should => should.get_or_insert_with(BTreeSet::new).extend(ids),
                Occur::MustNot => excluded.extend(ids),
            }
        }

        // Only exclusions: start from every document.
        let candidates = match (must, should) {
            (Some(must), _) => must,
            (None, Some(should)) => should,
            (None, None) => self.docs.keys().copied().collect(),
        };
        candidates.difference(&excluded).copied().collect()
    }

    fn get_internal(&self, key: &str) -> Option<Vec<u8>> {
        self.internal.get(key).cloned()
    }

    fn doc_count(&self) -> usize {
        self.docs.len()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
