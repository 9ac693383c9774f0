// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query-string syntax.
//!
//! ```text
//! query  := clause (WS clause)*
//! clause := ['+' | '-'] [field ':'] value
//! value  := word | '"' text '"' | word '*'
//! ```
//!
//! `+` clauses must match, `-` clauses must not. Plain clauses are
//! optional when a `+` clause is present; otherwise at least one must match.
//! A value spanning several tokens requires all of them. A lone `*`
//! matches every document.

use super::{tokenize, ALL_FIELD};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unterminated quote in {0:?}")]
    UnterminatedQuote(String),
    #[error("clause {0:?} has no searchable terms")]
    NoTerms(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Should,
    Must,
    MustNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub occur: Occur,
    pub field: String,
    /// Every token must be present; a trailing `*` makes a token a prefix.
    pub tokens: Vec<String>,
}

impl Clause {
    /// Whether this clause is the match-everything `*`.
    pub fn is_match_all(&self) -> bool {
        self.field == ALL_FIELD && self.tokens.len() == 1 && self.tokens[0] == "*"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let mut clauses = Vec::new();
        for raw in split_clauses(input)? {
            clauses.push(parse_clause(&raw)?);
        }
        if clauses.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self { clauses })
    }

    pub fn has_must(&self) -> bool {
        self.clauses.iter().any(|c| c.occur == Occur::Must)
    }
}

/// Split on whitespace outside double quotes.
fn split_clauses(input: &str) -> Result<Vec<String>, QueryError> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err(QueryError::UnterminatedQuote(current));
    }
    if !current.is_empty() {
        out.push(current);
    }
    Ok(out)
}

fn parse_clause(raw: &str) -> Result<Clause, QueryError> {
    let (occur, rest) = match raw.as_bytes().first() {
        Some(b'+') => (Occur::Must, &raw[1..]),
        Some(b'-') => (Occur::MustNot, &raw[1..]),
        _ => (Occur::Should, raw),
    };

    let (field, value) = match rest.split_once(':') {
        Some((field, value)) if !field.is_empty() && !field.starts_with('"') => {
            (field.to_lowercase(), value)
        }
        _ => (ALL_FIELD.to_string(), rest),
    };

    let value = value.trim_matches('"');
    let tokens = tokenize(value);
    if tokens.is_empty() {
        return Err(QueryError::NoTerms(raw.to_string()));
    }
    Ok(Clause {
        occur,
        field,
        tokens,
    })
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
