// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Duration, TimeZone};
use je_core::{JobId, WorkerId};
use yare::parameterized;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

#[parameterized(
    zero          = { 0,      "0s" },
    seconds       = { 59,     "59s" },
    one_minute    = { 60,     "1m" },
    minutes       = { 3599,   "59m" },
    one_hour      = { 3600,   "1h" },
    hour_minutes  = { 5400,   "1h30m" },
    almost_a_day  = { 86399,  "23h59m" },
    days          = { 172800, "2d" },
    negative      = { -5,     "0s" },
)]
fn duration(secs: i64, expected: &str) {
    assert_eq!(format_duration(Duration::seconds(secs)), expected);
}

#[test]
fn time_ago_counts_from_now() {
    assert_eq!(format_time_ago(at(0), at(125)), "2m");
}

#[test]
fn elapsed_is_dash_until_started() {
    let job = Job::new("sleep", vec!["1".into()], false, at(0));
    assert_eq!(format_elapsed(&job, at(30)), "-");
}

#[test]
fn elapsed_stops_at_terminal_time() {
    let mut job = Job::new("sleep", vec!["1".into()], false, at(0));
    job.enqueue(at(1)).unwrap();
    job.start(WorkerId::new("w1"), at(2)).unwrap();
    assert_eq!(format_elapsed(&job, at(12)), "10s");

    job.stop(at(5)).unwrap();
    assert_eq!(format_elapsed(&job, at(500)), "3s");
}

#[test]
fn details_of_finished_job() {
    let mut job = Job::new("grep", vec!["-c".into(), "x".into()], true, at(0));
    job.id = JobId(4);
    job.enqueue(at(0)).unwrap();
    job.start(WorkerId::new("w2"), at(1)).unwrap();
    job.status = 1;
    job.stop(at(3)).unwrap();

    let lines = job_details(&job, at(60), false);
    assert_eq!(lines[0], "ID:          4");
    assert_eq!(lines[1], "Command:     grep -c x");
    assert_eq!(lines[2], "State:       STOPPED");
    assert_eq!(lines[3], "Status:      1");
    assert_eq!(lines[4], "Interactive: yes");
    assert_eq!(lines[5], "Worker:      w2");
    assert!(lines[6].ends_with("(1m ago)"));
    assert_eq!(lines.last().map(String::as_str), Some("Elapsed:     2s"));
}

#[test]
fn details_of_pending_job_omit_status() {
    let job = Job::new("true", vec![], false, at(0));
    let lines = job_details(&job, at(0), false);
    assert!(lines.iter().all(|l| !l.starts_with("Status:")));
    assert!(lines.iter().all(|l| !l.starts_with("Worker:")));
}
