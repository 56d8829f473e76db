//! Log settings read from `AID_*` variables.

use std::env;

const DEFAULT_SERVICE: &str = "aid-ledger";
const DEFAULT_CLUSTER: &str = "devnet";

/// How the process logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Tag on the startup line.
    pub service_name: String,
    /// Filter directive, e.g. `info` or `al_04_cross_chain_bridge=debug`.
    pub log_level: String,
    /// Write log lines at all.
    pub console_output: bool,
    /// One JSON object per line instead of pretty output.
    pub json_logs: bool,
    /// Cluster the ledger talks to.
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE.to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: DEFAULT_CLUSTER.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// # Environment Variables
    ///
    /// - `AID_SERVICE_NAME` (default: aid-ledger)
    /// - `AID_LOG_LEVEL`, then `RUST_LOG` (default: info)
    /// - `AID_CONSOLE_OUTPUT` (default: true)
    /// - `AID_JSON_LOGS` (default: false, true inside a container)
    /// - `AID_NETWORK` (default: devnet)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let in_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("AID_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: env::var("AID_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: flag("AID_CONSOLE_OUTPUT").unwrap_or(defaults.console_output),
            json_logs: flag("AID_JSON_LOGS").unwrap_or(in_container),
            network: env::var("AID_NETWORK").unwrap_or(defaults.network),
        }
    }
}

fn flag(var: &str) -> Option<bool> {
    env::var(var).ok().map(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
