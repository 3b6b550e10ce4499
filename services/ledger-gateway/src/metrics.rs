// HTTP metrics for the ledger gateway
// Registered next to the ledger's own collectors so one /metrics scrape covers both

use crate::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_with_registry, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry,
};
use std::time::Instant;

#[derive(Clone)]
pub struct HttpMetrics {
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
    pub requests_in_flight: IntGauge,
}

impl HttpMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let requests_total = register_int_counter_vec_with_registry!(
            Opts::new("ledger_http_requests_total", "Total HTTP requests processed"),
            &["method", "route", "status"],
            registry
        )?;

        let request_duration_seconds = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "ledger_http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["method", "route"],
            registry
        )?;

        let requests_in_flight = register_int_gauge_with_registry!(
            Opts::new("ledger_http_requests_in_flight", "Current HTTP requests being processed"),
            registry
        )?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            requests_in_flight,
        })
    }

    pub fn observe(&self, method: &str, route: &str, status: u16, elapsed_secs: f64) {
        self.requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[method, route])
            .observe(elapsed_secs);
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics")
            .field("requests_in_flight", &self.requests_in_flight.get())
            .finish_non_exhaustive()
    }
}

/// Axum middleware recording count, latency and in-flight requests per matched route
pub async fn track_http(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let metrics = &state.http_metrics;
    metrics.requests_in_flight.inc();
    let response = next.run(request).await;
    metrics.requests_in_flight.dec();

    metrics.observe(
        &method,
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
