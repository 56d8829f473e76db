//! # Aid Telemetry
//!
//! Logging and metrics for every ledger component.
//!
//! Logs go through `tracing-subscriber` (env filter, pretty or JSON lines).
//! Counters and histograms live in one Prometheus registry that the host
//! process scrapes with [`gather_metrics`].
//!
//! ```rust,ignore
//! aid_telemetry::init_telemetry(&aid_telemetry::TelemetryConfig::from_env())?;
//! aid_telemetry::metric_inc!(aid_telemetry::metrics::DONATIONS, &["0"]);
//! ```
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AID_LOG_LEVEL` / `RUST_LOG` | `info` |
//! | `AID_JSON_LOGS` | `false` |
//! | `AID_CONSOLE_OUTPUT` | `true` |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod subscriber;

pub use config::TelemetryConfig;
pub use metrics::{gather_metrics, register_metrics};
pub use subscriber::init_logging;

use thiserror::Error;

/// Setup failures.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    /// Metric registration or encoding failed.
    #[error("Metrics registry: {0}")]
    MetricsInit(String),

    /// Bad filter directive.
    #[error("Invalid log filter: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Increment a counter, optionally by label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
