//! # Runtime Container
//!
//! Builds every component once and hands out shared handles.
//!
//! - `Local` mode hosts the ledger in process and simulates the source chain
//!   and attestation service. The ledger is bootstrapped with the configured
//!   pools through signed admin transactions.
//! - `Rpc` mode talks to a remote ledger, a wallet-enabled source-chain
//!   node and the attestation API.

pub mod config;
pub mod services;

pub use config::{BridgeConfig, ConfigError, LedgerConfig, LedgerMode, RuntimeConfig};
pub use services::{pool_name, AidContainer, LocalChains, LocalHost, LocalSettlement};
