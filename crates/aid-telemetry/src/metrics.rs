//! Prometheus metrics for the aid ledger.
//!
//! All metrics follow the naming convention: `aid_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., donations_total)
//! - **Gauge**: Value that can go up or down (e.g., active bridge sessions)
//! - **Histogram**: Distribution of values (e.g., attestation wait time)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SETTLEMENT METRICS (Component 2)
    // =========================================================================

    /// Credits to pools, by source (direct, bridged)
    pub static ref DONATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("aid_settlement_donations_total", "Credits applied to relief pools"),
        &["source"]
    ).expect("metric creation failed");

    /// Sum of all credited amounts
    pub static ref DONATED_AMOUNT: IntCounter = IntCounter::new(
        "aid_settlement_donated_amount_total",
        "Total amount credited to relief pools in base units"
    ).expect("metric creation failed");

    /// Successful NGO withdrawals
    pub static ref WITHDRAWALS: IntCounter = IntCounter::new(
        "aid_settlement_withdrawals_total",
        "Withdrawals executed by NGOs"
    ).expect("metric creation failed");

    /// Sum of all withdrawn amounts
    pub static ref WITHDRAWN_AMOUNT: IntCounter = IntCounter::new(
        "aid_settlement_withdrawn_amount_total",
        "Total amount withdrawn from relief pools in base units"
    ).expect("metric creation failed");

    /// Rejected operations by operation and error code
    pub static ref REJECTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("aid_settlement_rejections_total", "Rejected settlement operations"),
        &["operation", "code"]
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSACTION BUILDER METRICS (Component 3)
    // =========================================================================

    /// Submission outcomes (confirmed, expired, failed)
    pub static ref TX_SUBMISSIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("aid_builder_submissions_total", "Transaction submissions by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    // =========================================================================
    // BRIDGE METRICS (Component 4)
    // =========================================================================

    /// Session state transitions by target state
    pub static ref BRIDGE_TRANSITIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("aid_bridge_sessions_total", "Bridge session transitions by state"),
        &["state"]
    ).expect("metric creation failed");

    /// Sessions currently being driven
    pub static ref BRIDGE_ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "aid_bridge_active_sessions",
        "Bridge sessions with a running driver task"
    ).expect("metric creation failed");

    /// Attestation poll results (pending, complete, error)
    pub static ref ATTESTATION_POLLS: IntCounterVec = IntCounterVec::new(
        Opts::new("aid_bridge_attestation_polls_total", "Attestation service polls by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Time from burn confirmation to attestation
    pub static ref ATTESTATION_WAIT: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aid_bridge_attestation_wait_seconds",
            "Time spent waiting for attestations"
        ).buckets(exponential_buckets(1.0, 2.0, 12).expect("bucket creation failed"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Settlement
        Box::new(DONATIONS.clone()),
        Box::new(DONATED_AMOUNT.clone()),
        Box::new(WITHDRAWALS.clone()),
        Box::new(WITHDRAWN_AMOUNT.clone()),
        Box::new(REJECTIONS.clone()),
        // Builder
        Box::new(TX_SUBMISSIONS.clone()),
        // Bridge
        Box::new(BRIDGE_TRANSITIONS.clone()),
        Box::new(BRIDGE_ACTIVE_SESSIONS.clone()),
        Box::new(ATTESTATION_POLLS.clone()),
        Box::new(ATTESTATION_WAIT.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
