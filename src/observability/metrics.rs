//! Metrics collection and exposition.
//!
//! # Metrics
//! - `register_vulcan_cycles_total` (counter): cycles by outcome
//! - `register_vulcan_registry_ops_total` (counter): registry calls by operation, result
//! - `register_vulcan_healthy` (gauge): 1=healthy, 0=unhealthy on the last probe
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::control::CycleOutcome;
use crate::health::HealthStatus;

/// Serve a Prometheus scrape endpoint on `addr`. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_health(status: HealthStatus) {
    let value = if status.is_healthy() { 1.0 } else { 0.0 };
    ::metrics::gauge!("register_vulcan_healthy").set(value);
}

pub fn record_cycle(outcome: CycleOutcome) {
    ::metrics::counter!("register_vulcan_cycles_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_registry_op(operation: &'static str, success: bool) {
    let result = if success { "ok" } else { "error" };
    ::metrics::counter!(
        "register_vulcan_registry_ops_total",
        "operation" => operation,
        "result" => result
    )
    .increment(1);
}
