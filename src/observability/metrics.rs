//! Metrics collection and exposition.
//!
//! # Metrics
//! - `catalog_upstream_requests_total` (counter): upstream calls by operation, outcome
//! - `catalog_cache_lookups_total` (counter): cache reads by result (hit/miss)
//! - `catalog_cache_entries` (gauge): entries currently stored
//! - `catalog_fallback_served_total` (counter): fallback substitutions by operation
//! - `catalog_breaker_open` (gauge): 1=open, 0=closed
//! - `catalog_breaker_consecutive_failures` (gauge)

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_upstream_call(operation: &'static str, outcome: &'static str) {
    counter!(
        "catalog_upstream_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("catalog_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("catalog_cache_entries").set(entries as f64);
}

pub fn record_fallback_served(operation: &'static str) {
    counter!("catalog_fallback_served_total", "operation" => operation).increment(1);
}

pub fn record_breaker_open(open: bool) {
    gauge!("catalog_breaker_open").set(if open { 1.0 } else { 0.0 });
}

pub fn record_breaker_failures(failures: u32) {
    gauge!("catalog_breaker_consecutive_failures").set(f64::from(failures));
}
