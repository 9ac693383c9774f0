// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use je_core::{DataKind, JobState, TransitionError};
use yare::parameterized;

fn status_of(err: impl Into<ApiError>) -> StatusCode {
    err.into().status()
}

#[parameterized(
    store_missing = { status_of(StoreError::NotFound(JobId(4))), StatusCode::NOT_FOUND },
    store_closed = { status_of(StoreError::Closed), StatusCode::SERVICE_UNAVAILABLE },
    store_remote = { status_of(StoreError::Remote("down".into())), StatusCode::INTERNAL_SERVER_ERROR },
    data_missing = { status_of(DataError::NotFound { id: JobId(1), kind: DataKind::Logs }), StatusCode::NOT_FOUND },
    queue_full = { status_of(QueueError::Full), StatusCode::SERVICE_UNAVAILABLE },
    invalid_op = { status_of(TaskError::InvalidOperation { id: JobId(2), message: "not interactive".into() }), StatusCode::BAD_REQUEST },
    transition = { status_of(TaskError::Transition(TransitionError::InvalidTransition { id: JobId(2), from: JobState::Stopped, to: JobState::Killed })), StatusCode::BAD_REQUEST },
    no_task = { status_of(PoolError::TaskNotFound(JobId(9))), StatusCode::NOT_FOUND },
    nested = { status_of(PoolError::Task(TaskError::Store(StoreError::NotFound(JobId(3))))), StatusCode::NOT_FOUND },
)]
fn maps_status(actual: StatusCode, expected: StatusCode) {
    assert_eq!(actual, expected);
}

#[test]
fn not_found_body_carries_id() {
    let body = ApiError::from(StoreError::NotFound(JobId(12))).body();
    assert_eq!(body.id, Some(JobId(12)));
    assert_eq!(body.error, "key does not exist: 12");
}

#[test]
fn other_bodies_have_no_id() {
    let body = ApiError::bad_request("bad job id").body();
    assert_eq!(body, ErrorBody { error: "bad job id".into(), id: None });
}
