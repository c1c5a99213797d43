//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ssr_renders_total` (counter): rendered news pages by meta outcome
//! - `ssr_fallbacks_total` (counter): pages served by the error boundary
//! - `ssr_upstream_fetch_duration_seconds` (histogram): fetch race latency by outcome
//! - `ssr_upstream_attempts_total` (counter): per-strategy attempt results
//! - `api_proxy_requests_total` (counter): passthrough requests by status
//! - `api_proxy_duration_seconds` (histogram): passthrough latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_render(meta: &'static str) {
    counter!("ssr_renders_total", "meta" => meta).increment(1);
}

pub fn record_fallback() {
    counter!("ssr_fallbacks_total").increment(1);
}

pub fn record_upstream_fetch(outcome: &'static str, start: Instant) {
    histogram!("ssr_upstream_fetch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_attempt(strategy: &str, outcome: &'static str) {
    counter!(
        "ssr_upstream_attempts_total",
        "strategy" => strategy.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_proxy_request(status: u16, start: Instant) {
    counter!("api_proxy_requests_total", "status" => status.to_string()).increment(1);
    histogram!("api_proxy_duration_seconds").record(start.elapsed().as_secs_f64());
}
