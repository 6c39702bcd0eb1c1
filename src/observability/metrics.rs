//! Metrics collection and exposition.
//!
//! # Metrics
//! - `items_api_requests_total` (counter): requests by method, route, status
//! - `items_api_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Labels use the matched route pattern, not the raw path, to bound cardinality
//! - Recording is a no-op until a recorder is installed

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::Label;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
        Label::new("status", status.to_string()),
    ];
    metrics::counter!("items_api_requests_total", labels.clone()).increment(1);
    metrics::histogram!("items_api_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware timing every routed request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), &route, start);
    response
}
