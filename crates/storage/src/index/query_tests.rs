// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn single(input: &str) -> Clause {
    let query = Query::parse(input).unwrap();
    assert_eq!(query.clauses.len(), 1);
    query.clauses.into_iter().next().unwrap()
}

#[yare::parameterized(
    bare       = { "echo", Occur::Should, "_all", &["echo"] },
    fielded    = { "name:echo", Occur::Should, "name", &["echo"] },
    must       = { "+state:running", Occur::Must, "state", &["running"] },
    must_not   = { "-state:KILLED", Occur::MustNot, "state", &["killed"] },
    field_case = { "Name:Echo", Occur::Should, "name", &["echo"] },
    quoted     = { "args:\"hello world\"", Occur::Should, "args", &["hello", "world"] },
    prefix     = { "name:ec*", Occur::Should, "name", &["ec*"] },
    colon_text = { ":echo", Occur::Should, "_all", &["echo"] },
)]
fn parse_clause_forms(input: &str, occur: Occur, field: &str, tokens: &[&str]) {
    let clause = single(input);
    assert_eq!(clause.occur, occur);
    assert_eq!(clause.field, field);
    assert_eq!(clause.tokens, tokens);
}

#[test]
fn parse_multiple_clauses_respects_quotes() {
    let query = Query::parse("+name:sleep  -\"state:killed\" args:\"a b\"").unwrap();
    assert_eq!(query.clauses.len(), 3);
    assert!(query.has_must());
    assert_eq!(query.clauses[2].tokens, vec!["a", "b"]);
}

#[test]
fn match_all_star() {
    assert!(single("*").is_match_all());
    assert!(!single("name:*").is_match_all());
}

#[yare::parameterized(
    empty       = { "", QueryError::Empty },
    blank       = { "   ", QueryError::Empty },
    punctuation = { "name:--", QueryError::NoTerms("name:--".to_string()) },
    open_quote  = { "name:\"abc", QueryError::UnterminatedQuote("name:\"abc".to_string()) },
)]
fn parse_errors(input: &str, expected: QueryError) {
    assert_eq!(Query::parse(input).unwrap_err(), expected);
}
