// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::JobState;
use yare::parameterized;

#[parameterized(
    all = { SearchFilter::All, vec![] },
    ids = { SearchFilter::Ids(vec![JobId(3), JobId(1)]), vec![("ids", "3,1")] },
    name = { SearchFilter::Name("echo".into()), vec![("q", "name:echo")] },
    state = { SearchFilter::State(JobState::Running), vec![("q", "state:RUNNING")] },
    query = { SearchFilter::Query("+name:a -state:killed".into()), vec![("q", "+name:a -state:killed")] },
)]
fn search_filter_params(filter: SearchFilter, expected: Vec<(&str, &str)>) {
    let params = filter.params();
    let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    assert_eq!(params, expected);
}

#[parameterized(
    plain = { "http://127.0.0.1:8000", &["search", "4"], "http://127.0.0.1:8000/search/4" },
    trailing_slash = { "http://127.0.0.1:8000/", &["workers"], "http://127.0.0.1:8000/workers" },
    prefix = { "http://host/api/", &["bus", "jobs"], "http://host/api/bus/jobs" },
    encoded = { "http://host", &["create", "my tool"], "http://host/create/my%20tool" },
    slash_in_name = { "http://host", &["create", "a/b"], "http://host/create/a%2Fb" },
)]
fn url_joins_segments(base: &str, segments: &[&str], expected: &str) {
    let client = Client::new(base).unwrap();
    assert_eq!(client.url(segments).as_str(), expected);
}

#[test]
fn rejects_unparseable_base() {
    let err = Client::new("not a url").err().unwrap();
    assert!(matches!(err, ClientError::InvalidUrl { .. }));
}

#[test]
fn create_request_builder() {
    let req = CreateRequest::new("sleep").args(["1"]).interactive(true).wait(true);
    assert_eq!(req.name, "sleep");
    assert_eq!(req.args, vec!["1".to_string()]);
    assert!(req.interactive);
    assert!(req.wait);
}

#[test]
fn error_body_omits_missing_id() {
    let body = ErrorBody {
        error: "boom".into(),
        id: None,
    };
    assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"boom"}"#);

    let parsed: ErrorBody = serde_json::from_str(r#"{"error":"key does not exist: 7","id":7}"#).unwrap();
    assert_eq!(parsed.id, Some(JobId(7)));
}

#[test]
fn read_routes_per_kind() {
    assert_eq!(read_route(DataKind::Input), "read");
    assert_eq!(read_route(DataKind::Output), "output");
    assert_eq!(read_route(DataKind::Logs), "logs");
}
