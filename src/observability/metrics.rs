//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_sign_requests_total` (counter): by wallet kind and outcome
//! - `wallet_fallbacks_total` (counter): by source and target kind
//! - `wallet_teardown_failures_total` (counter): by backend
//! - `chain_rpc_requests_total` (counter): by operation and result
//! - `chain_settlement_seconds` (histogram): submit-to-settled latency
//! - `backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests never need to call [`init_metrics`].

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_sign_request(kind: &'static str, outcome: &'static str) {
    counter!("wallet_sign_requests_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_fallback(from: &'static str, to: &'static str) {
    counter!("wallet_fallbacks_total", "from" => from, "to" => to).increment(1);
}

pub fn record_teardown_failure(backend: &'static str) {
    counter!("wallet_teardown_failures_total", "backend" => backend).increment(1);
}

pub fn record_rpc(op: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("chain_rpc_requests_total", "op" => op, "result" => result).increment(1);
}

pub fn record_settlement(success: bool, started: Instant) {
    let result = if success { "success" } else { "aborted" };
    histogram!("chain_settlement_seconds", "result" => result)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("backend_health", "backend" => backend.to_string()).set(if healthy { 1.0 } else { 0.0 });
}
