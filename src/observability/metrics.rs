//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by response status
//! - `gateway_request_duration_seconds` (histogram): time to response head
//! - `gateway_upstream_calls_total` (counter): upstream calls by operation, outcome
//! - `gateway_not_modified_total` (counter): requests answered from a matching checksum

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(status: u16, start: Instant) {
    counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_call(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("gateway_upstream_calls_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

pub fn record_not_modified() {
    counter!("gateway_not_modified_total").increment(1);
}
