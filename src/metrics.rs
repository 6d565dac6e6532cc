//! Prometheus metrics for request tracking and monitoring.
//!
//! This module provides metrics for:
//! - HTTP request counts and latency, per route
//! - Items created
//! - Storage backend failures
//!
//! The recorder is built once at startup; its [`PrometheusHandle`] renders the
//! `/metrics` endpoint.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tracing::debug;

use crate::error::AppError;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Items created counter metric name.
pub const METRIC_ITEMS_CREATED: &str = "items_created_total";
/// Storage failures counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";
/// Build info gauge metric name.
pub const METRIC_APP_INFO: &str = "app_info";

/// How often histogram buckets are drained.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Build a recorder without installing it.
pub fn build_recorder() -> PrometheusRecorder {
    PrometheusBuilder::new().build_recorder()
}

/// Install the recorder process-wide and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, AppError> {
    let recorder = build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).map_err(|e| AppError::Metrics(e.to_string()))?;
    Ok(handle)
}

/// Periodically run exporter upkeep so histograms don't grow unbounded.
pub fn spawn_upkeep(handle: PrometheusHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics(version: &str, backend: &str) {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "HTTP request latency in seconds"
    );
    describe_counter!(METRIC_ITEMS_CREATED, "Total number of items created");
    describe_counter!(
        METRIC_STORE_ERRORS,
        "Total number of failed storage operations"
    );
    describe_gauge!(METRIC_APP_INFO, "Application info");

    gauge!(
        METRIC_APP_INFO,
        "version" => version.to_string(),
        "backend" => backend.to_string()
    )
    .set(1.0);

    debug!("Metrics initialized");
}

/// Increment items created counter.
pub fn inc_items_created() {
    counter!(METRIC_ITEMS_CREATED).increment(1);
}

/// Increment storage failures counter.
pub fn inc_store_errors(operation: &'static str) {
    counter!(METRIC_STORE_ERRORS, "operation" => operation).increment(1);
}

/// Record a finished HTTP request.
pub fn record_http_request(start: Instant, method: &str, path: &str, status: u16) {
    let latency = start.elapsed().as_secs_f64();
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        METRIC_HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency);
}

/// Middleware recording count and latency for every request.
///
/// Labels use the matched route template so ids don't explode cardinality.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    record_http_request(start, &method, &path, response.status().as_u16());
    response
}
