// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injected metrics sink.
//!
//! Components report counters and timings through [`Metrics`]; what
//! happens to them (logs, an exporter, nothing) is up to the binary.

/// Label pairs attached to one sample.
pub type Labels<'a> = &'a [(&'a str, &'a str)];

pub trait Metrics: Send + Sync + 'static {
    /// Increment a counter by one.
    fn incr(&self, name: &str, labels: Labels<'_>);

    /// Record one observation (durations are in seconds).
    fn observe(&self, name: &str, value: f64, labels: Labels<'_>);
}

/// Discards every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl Metrics for NoOpMetrics {
    fn incr(&self, _name: &str, _labels: Labels<'_>) {}

    fn observe(&self, _name: &str, _value: f64, _labels: Labels<'_>) {}
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMetrics, MetricCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{Labels, Metrics};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded sample. Counters record `value == 1.0`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct MetricCall {
        pub name: String,
        pub value: f64,
        pub labels: Vec<(String, String)>,
    }

    /// Metrics sink that records every call for assertions.
    #[derive(Clone, Default)]
    pub struct FakeMetrics {
        calls: Arc<Mutex<Vec<MetricCall>>>,
    }

    impl FakeMetrics {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<MetricCall> {
            self.calls.lock().clone()
        }

        /// Number of samples recorded under `name`.
        pub fn count(&self, name: &str) -> usize {
            self.calls.lock().iter().filter(|c| c.name == name).count()
        }

        fn record(&self, name: &str, value: f64, labels: Labels<'_>) {
            self.calls.lock().push(MetricCall {
                name: name.to_string(),
                value,
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
    }

    impl Metrics for FakeMetrics {
        fn incr(&self, name: &str, labels: Labels<'_>) {
            self.record(name, 1.0, labels);
        }

        fn observe(&self, name: &str, value: f64, labels: Labels<'_>) {
            self.record(name, value, labels);
        }
    }
}
