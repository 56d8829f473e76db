//! Runtime wiring errors.

use crate::container::ConfigError;
use al_02_settlement::SettlementError;
use al_03_transaction_builder::BuilderError;
use al_04_cross_chain_bridge::BridgeError;
use thiserror::Error;

/// Failures while assembling or running the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Ledger bootstrap failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] SettlementError),

    /// Transaction building or submission failed.
    #[error("Transaction error: {0}")]
    Transaction(#[from] BuilderError),

    /// Bridge wiring or recovery failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// RPC mode needs a relayer key to credit bridged donations.
    #[error("RPC mode requires a relayer keypair")]
    MissingRelayer,
}
