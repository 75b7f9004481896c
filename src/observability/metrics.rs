//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): gate outcomes by `outcome`
//! - `gate_check_panics_total` (counter): checks that panicked and failed open
//! - `gate_fail_open_total` (counter): requests admitted unchecked, by `cause`
//! - `gate_active_sessions` (gauge): sessions held in memory
//! - `gate_page_render_seconds` (histogram): page handler latency
//!
//! Recording is a no-op until a recorder is installed, so tests and library
//! users need not call `init_metrics`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_gate_decision(outcome: &'static str) {
    counter!("gate_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_check_panic() {
    counter!("gate_check_panics_total").increment(1);
}

pub fn record_fail_open(cause: &'static str) {
    counter!("gate_fail_open_total", "cause" => cause).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("gate_active_sessions").set(count as f64);
}

pub fn record_page_render(section: &str, start: Instant) {
    histogram!("gate_page_render_seconds", "section" => section.to_string())
        .record(start.elapsed().as_secs_f64());
}
