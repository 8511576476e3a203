//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sync_operations_total` (counter): gateway operations by operation, outcome
//! - `sync_retries_total` (counter): retried attempts by operation, failure class
//! - `sync_throttled_total` (counter): calls delayed by the health monitor
//! - `sync_connection_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `sync_invalidations_total` (counter): invalidation signals raised by topic
//!
//! Updates are cheap no-ops until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::FailureClass;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_operation(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("sync_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

pub fn record_retry(operation: &'static str, class: FailureClass) {
    ::metrics::counter!("sync_retries_total", "operation" => operation, "class" => class.as_str())
        .increment(1);
}

pub fn record_throttled(operation: &'static str) {
    ::metrics::counter!("sync_throttled_total", "operation" => operation).increment(1);
}

pub fn record_connection_health(healthy: bool) {
    ::metrics::gauge!("sync_connection_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_invalidation(topic: &'static str) {
    ::metrics::counter!("sync_invalidations_total", "topic" => topic).increment(1);
}
