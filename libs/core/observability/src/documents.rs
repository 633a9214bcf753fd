//! Metrics for document store calls.

use metrics::{counter, histogram};
use std::time::Duration;

/// How a single document store call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    NotFound,
    Conflict,
    Timeout,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::NotFound => "not_found",
            Outcome::Conflict => "conflict",
            Outcome::Timeout => "timeout",
            Outcome::Error => "error",
        }
    }
}

/// Document store metrics recorder
pub struct DocumentMetrics;

impl DocumentMetrics {
    /// Record one call against `collection`.
    ///
    /// - `document_operations_total{operation, collection, outcome}`
    /// - `document_operation_duration_seconds{operation, collection}`
    pub fn record(operation: &'static str, collection: &str, outcome: Outcome, duration: Duration) {
        counter!(
            "document_operations_total",
            "operation" => operation,
            "collection" => collection.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);

        histogram!(
            "document_operation_duration_seconds",
            "operation" => operation,
            "collection" => collection.to_string()
        )
        .record(duration.as_secs_f64());

        tracing::debug!(
            operation,
            collection,
            outcome = outcome.as_str(),
            duration_ms = duration.as_millis() as u64,
            "Document operation finished"
        );
    }
}
