//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): inbound requests by outcome
//! - `router_request_duration_seconds` (histogram): end-to-end latency
//! - `router_forward_attempts_total` (counter): worker calls by instance, result
//! - `router_health_probes_total` (counter): probe results
//! - `router_instance_healthy` (gauge): 1=in rotation, 0=excluded

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::load_balancer::Instance;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, start: Instant) {
    ::metrics::counter!("router_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("router_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_forward_attempt(instance: &Instance, success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "router_forward_attempts_total",
        "instance" => instance.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_health_probe(healthy: bool) {
    let result = if healthy { "up" } else { "down" };
    ::metrics::counter!("router_health_probes_total", "result" => result).increment(1);
}

pub fn record_instance_health(instance: &Instance, healthy: bool) {
    ::metrics::gauge!("router_instance_healthy", "instance" => instance.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
