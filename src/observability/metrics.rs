//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by route, method, status
//! - `gateway_request_duration_seconds` (histogram): time to upstream response headers
//! - `gateway_upstream_errors_total` (counter): failed upstream calls by route, error type
//!
//! Without an installed recorder the macros are no-ops, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a proxied request that produced an upstream response.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "gateway_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a failed upstream call.
pub fn record_upstream_error(route: &str, error_type: &'static str) {
    metrics::counter!(
        "gateway_upstream_errors_total",
        "route" => route.to_string(),
        "error" => error_type
    )
    .increment(1);
}
