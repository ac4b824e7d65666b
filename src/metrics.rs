//! Downstream metrics sink.
//!
//! The [`Executor`](crate::store::Executor) reports one [`OperationRecord`] per store call, so a
//! paged read reports once per page.

use std::time;

/// Outcome of a store call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The call returned a response.
    Success,
    /// The call failed; carries the error message.
    Failure(String),
}

/// What a sink receives for each store call.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRecord {
    /// The operation name, e.g. `scan` or `transact_write_items`.
    pub operation: &'static str,
    /// Debug rendering of the request.
    pub request: String,
    /// Debug rendering of the response, empty on failure.
    pub response: String,
    /// When the call started.
    pub start_time: time::SystemTime,
    /// How long the call took.
    pub duration: time::Duration,
    /// Capacity units consumed, when the store reported them.
    pub cost: Option<f64>,
    /// Whether the call succeeded.
    pub outcome: Outcome,
}

/// Receiver of operation records.
///
/// Implementations must be cheap: `record` runs inline on the caller's task.
pub trait MetricsSink: Send + Sync {
    /// Record one store call under `category`.
    fn record(&self, category: &str, record: OperationRecord);

    /// Whether records should be built at all.
    ///
    /// Rendering payloads is not free; sinks that drop everything return `false`.
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink that drops every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _category: &str, _record: OperationRecord) {}

    fn enabled(&self) -> bool {
        false
    }
}
