//! # Runtime Configuration
//!
//! Ledger, bridge and telemetry settings, loaded from `AID_*` environment
//! variables over defaults for the devnet / Sepolia deployment.

use aid_telemetry::TelemetryConfig;
use al_01_address_derivation::DEFAULT_PROGRAM_ID;
use al_02_settlement::PRIMARY_CHAIN_DOMAIN;
use al_03_transaction_builder::adapters::rpc::DEVNET_URL;
use al_03_transaction_builder::{Commitment, EvmNetwork, KNOWN_POOL_IDS};
use al_04_cross_chain_bridge::{
    BridgePolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, IRIS_SANDBOX_URL,
};
use shared_types::{EthAddress, PoolId, Pubkey};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid {var}: {reason}")]
    InvalidVar {
        /// Variable name
        var: &'static str,
        /// Parse failure
        reason: String,
    },

    /// Values parse but do not make sense together.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the ledger runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerMode {
    /// In-process ledger host with a simulated source chain.
    #[default]
    Local,
    /// Remote ledger over JSON-RPC, real source chain and attestation API.
    Rpc,
}

impl FromStr for LedgerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "rpc" => Ok(Self::Rpc),
            other => Err(format!("expected local or rpc, got {other}")),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Primary-chain ledger settings.
    pub ledger: LedgerConfig,
    /// Bridge settings.
    pub bridge: BridgeConfig,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
}

impl RuntimeConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ledger: LedgerConfig::from_env()?,
            bridge: BridgeConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
        })
    }

    /// Cross-field checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate()?;
        self.bridge.validate()?;
        if self.bridge.source.domain == self.ledger.local_domain {
            return Err(ConfigError::Invalid(
                "source and destination domains must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Primary-chain ledger settings.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Local host or remote RPC.
    pub mode: LedgerMode,
    /// Ledger program id.
    pub program_id: Pubkey,
    /// JSON-RPC endpoint (rpc mode).
    pub rpc_url: String,
    /// Pool ids the read path enumerates.
    pub known_pools: Vec<PoolId>,
    /// Confirmation depth required for success.
    pub commitment: Commitment,
    /// Bridge domain of the primary chain.
    pub local_domain: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Local,
            program_id: DEFAULT_PROGRAM_ID,
            rpc_url: DEVNET_URL.to_string(),
            known_pools: KNOWN_POOL_IDS.to_vec(),
            commitment: Commitment::Confirmed,
            local_domain: PRIMARY_CHAIN_DOMAIN,
        }
    }
}

impl LedgerConfig {
    /// # Environment Variables
    ///
    /// - `AID_LEDGER_MODE`: `local` or `rpc` (default: local)
    /// - `AID_PROGRAM_ID`: base58 program id
    /// - `AID_RPC_URL`: JSON-RPC endpoint (default: devnet)
    /// - `AID_KNOWN_POOLS`: comma-separated pool ids (default: 0,1,2)
    /// - `AID_COMMITMENT`: confirmed or finalized (default: confirmed)
    /// - `AID_LOCAL_DOMAIN`: bridge domain of this chain (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            mode: env_parse("AID_LEDGER_MODE", defaults.mode)?,
            program_id: env_parse("AID_PROGRAM_ID", defaults.program_id)?,
            rpc_url: env::var("AID_RPC_URL").unwrap_or(defaults.rpc_url),
            known_pools: match env::var("AID_KNOWN_POOLS") {
                Ok(list) => parse_pool_list(&list)?,
                Err(_) => defaults.known_pools,
            },
            commitment: env_parse("AID_COMMITMENT", defaults.commitment)?,
            local_domain: env_parse("AID_LOCAL_DOMAIN", defaults.local_domain)?,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.known_pools.is_empty() {
            return Err(ConfigError::Invalid("known pool list is empty".into()));
        }
        let mut sorted = self.known_pools.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.known_pools.len() {
            return Err(ConfigError::Invalid("known pool list has duplicates".into()));
        }
        if self.commitment == Commitment::Processed {
            return Err(ConfigError::Invalid(
                "processed is not an acceptable success depth".into(),
            ));
        }
        if self.mode == LedgerMode::Rpc && self.rpc_url.is_empty() {
            return Err(ConfigError::Invalid("rpc mode needs AID_RPC_URL".into()));
        }
        Ok(())
    }
}

/// Bridge settings.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Source chain contracts and ids.
    pub source: EvmNetwork,
    /// Source-chain JSON-RPC endpoint with wallet access (rpc mode).
    pub evm_rpc_url: String,
    /// Attestation service base URL.
    pub iris_url: String,
    /// Delay between attestation polls.
    pub poll_interval: Duration,
    /// Polls before a session is parked as stuck.
    pub max_attempts: u32,
    /// Directory of persisted sessions.
    pub session_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            source: EvmNetwork::sepolia(),
            evm_rpc_url: "http://127.0.0.1:8545".to_string(),
            iris_url: IRIS_SANDBOX_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            session_dir: PathBuf::from("./data/sessions"),
        }
    }
}

impl BridgeConfig {
    /// # Environment Variables
    ///
    /// - `AID_SOURCE_CHAIN_ID`, `AID_SOURCE_DOMAIN`
    /// - `AID_TOKEN_MESSENGER`, `AID_USDC`: 0x-hex contract addresses
    /// - `AID_EVM_RPC_URL`: source-chain node with wallet access
    /// - `AID_IRIS_URL`: attestation service (default: sandbox)
    /// - `AID_POLL_INTERVAL_SECS` (default: 10), `AID_MAX_ATTEMPTS` (default: 90)
    /// - `AID_SESSION_DIR` (default: ./data/sessions)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let source = EvmNetwork {
            chain_id: env_parse("AID_SOURCE_CHAIN_ID", defaults.source.chain_id)?,
            domain: env_parse("AID_SOURCE_DOMAIN", defaults.source.domain)?,
            token_messenger: env_parse::<EthAddress>(
                "AID_TOKEN_MESSENGER",
                defaults.source.token_messenger,
            )?,
            usdc: env_parse::<EthAddress>("AID_USDC", defaults.source.usdc)?,
        };
        Ok(Self {
            source,
            evm_rpc_url: env::var("AID_EVM_RPC_URL").unwrap_or(defaults.evm_rpc_url),
            iris_url: env::var("AID_IRIS_URL").unwrap_or(defaults.iris_url),
            poll_interval: Duration::from_secs(env_parse(
                "AID_POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )?),
            max_attempts: env_parse("AID_MAX_ATTEMPTS", defaults.max_attempts)?,
            session_dir: env::var("AID_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
        })
    }

    /// Orchestrator polling policy.
    pub fn policy(&self) -> BridgePolicy {
        BridgePolicy {
            poll_interval: self.poll_interval,
            max_attempts: self.max_attempts,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max attempts must be positive".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll interval must be positive".into()));
        }
        if self.source.token_messenger == self.source.usdc {
            return Err(ConfigError::Invalid(
                "token messenger and token must differ".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_pool_list(list: &str) -> Result<Vec<PoolId>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidVar {
                var: "AID_KNOWN_POOLS",
                reason: e.to_string(),
            })
        })
        .collect()
}
