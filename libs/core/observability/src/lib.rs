//! Observability utilities for the item catalog service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Document store operation metrics
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, DocumentMetrics, Outcome};
//!
//! init_metrics();
//! DocumentMetrics::record("get", "items", Outcome::Ok, elapsed);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod documents;
pub mod middleware;

pub use documents::{DocumentMetrics, Outcome};
pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup; later calls return the same handle. If another
/// global recorder is already installed, metrics are rendered empty.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            handle
        }
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed");
            PrometheusBuilder::new().build_recorder().handle()
        }
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    describe_counter!(
        "document_operations_total",
        "Document store calls by operation, collection and outcome"
    );
    describe_histogram!(
        "document_operation_duration_seconds",
        "Document store call duration in seconds"
    );
}
