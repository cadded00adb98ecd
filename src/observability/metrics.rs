//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_requests_total` (counter): requests by endpoint and outcome
//!
//! # Design Decisions
//! - Counters are recorded even when no exporter is installed (no-op recorder)
//! - The Prometheus listener only starts when `metrics_address` is configured

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const WEBHOOK_REQUESTS_TOTAL: &str = "webhook_requests_total";

pub const OUTCOME_ACCEPTED: &str = "accepted";

/// Install the global Prometheus recorder with a scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe_counter!(
        WEBHOOK_REQUESTS_TOTAL,
        "Webhook requests by endpoint and admission outcome"
    );
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one admission decision.
pub fn record_admission(endpoint: &str, outcome: &'static str) {
    metrics::counter!(
        WEBHOOK_REQUESTS_TOTAL,
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
