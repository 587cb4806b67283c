//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hotcfg_reloads_total` (counter): reload attempts by outcome
//!   (`applied`, `unchanged`, `empty`, `failed`)
//! - `hotcfg_source_failures_total` (counter): transport failures by source (`file`, `url`)
//! - `hotcfg_entries` (gauge): number of names known to the registry
//!
//! Recording is a no-op until a recorder is installed, so library users who do
//! not care about metrics pay nothing.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied,
    Unchanged,
    Empty,
    Failed,
}

impl ReloadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadOutcome::Applied => "applied",
            ReloadOutcome::Unchanged => "unchanged",
            ReloadOutcome::Empty => "empty",
            ReloadOutcome::Failed => "failed",
        }
    }
}

pub fn record_reload(outcome: ReloadOutcome) {
    metrics::counter!("hotcfg_reloads_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_source_failure(source: &'static str) {
    metrics::counter!("hotcfg_source_failures_total", "source" => source).increment(1);
}

pub fn record_entries(count: usize) {
    metrics::gauge!("hotcfg_entries").set(count as f64);
}

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}
