//! Metrics collection and exposition.
//!
//! # Metrics
//! - `da_submissions_total` (counter): broadcasts by backend, outcome
//! - `da_confirmations_total` (counter): confirmation runs by backend, final state
//! - `da_poll_ticks_total` (counter): status queries by backend
//! - `da_confirmation_seconds` (histogram): time from first poll to terminal state
//! - `da_rpc_health` (gauge): 1=healthy, 0=unhealthy
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are static strings; handles never become labels

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::submission::types::{BackendKind, ConfirmationState};

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one broadcast attempt.
pub fn record_submission(backend: BackendKind, outcome: &'static str) {
    metrics::counter!(
        "da_submissions_total",
        "backend" => backend.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record one status query.
pub fn record_poll_tick(backend: BackendKind) {
    metrics::counter!("da_poll_ticks_total", "backend" => backend.as_str()).increment(1);
}

/// Record the end of a confirmation run.
pub fn record_confirmation(backend: BackendKind, state: ConfirmationState, elapsed: Duration) {
    metrics::counter!(
        "da_confirmations_total",
        "backend" => backend.as_str(),
        "state" => state.as_str()
    )
    .increment(1);
    metrics::histogram!("da_confirmation_seconds", "backend" => backend.as_str())
        .record(elapsed.as_secs_f64());
}

/// Record RPC reachability of a backend endpoint.
pub fn record_backend_health(backend: &'static str, healthy: bool) {
    metrics::gauge!("da_rpc_health", "backend" => backend).set(if healthy { 1.0 } else { 0.0 });
}
