// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn ps_args(state: Option<JobState>, name: Option<&str>, all: bool) -> PsArgs {
    PsArgs {
        quiet: false,
        state,
        name: name.map(str::to_string),
        all,
    }
}

#[parameterized(
    default_running = { None, None, false, SearchFilter::State(JobState::Running) },
    explicit_state  = { Some(JobState::Killed), None, false, SearchFilter::State(JobState::Killed) },
    all             = { None, None, true, SearchFilter::All },
    name_all        = { None, Some("echo"), true, SearchFilter::Name("echo".into()) },
    name_and_state  = { None, Some("echo"), false, SearchFilter::Query("+name:echo +state:RUNNING".into()) },
)]
fn ps_filter(state: Option<JobState>, name: Option<&str>, all: bool, expected: SearchFilter) {
    assert_eq!(ps_args(state, name, all).filter(), expected);
}

#[test]
fn ps_table_shows_status_only_when_finished() {
    let now = Utc::now();
    let mut pending = Job::new("sleep", vec!["9".into()], false, now);
    pending.id = JobId(1);
    let mut done = Job::new("true", vec![], false, now);
    done.id = JobId(2);
    done.enqueue(now).unwrap();
    done.start(je_core::WorkerId::new("w1"), now).unwrap();
    done.stop(now).unwrap();

    let mut out = Vec::new();
    ps_table(&[pending, done], Table::plain(ps_columns()))
        .render(&mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID  NAME"));
    assert!(lines[1].contains("CREATED") && lines[1].contains(" - "));
    assert!(lines[2].contains("STOPPED") && lines[2].contains(" 0 "));
}
