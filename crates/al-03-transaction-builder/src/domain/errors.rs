//! # Builder Errors
//!
//! Validation errors are raised before any network call. Network errors are
//! always retryable. Program errors carry the settlement code reported by
//! the chain.

use al_02_settlement::{ErrorCode, SettlementError};
use shared_types::Pubkey;
use thiserror::Error;

/// Transaction builder error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Intent rejected before building (bad amount, name, list size).
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// Address derivation failed.
    #[error("Address derivation failed: {0}")]
    Derivation(String),

    /// Instruction or account data could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Message has more accounts or bytes than the wire format allows.
    #[error("Message too large: {0}")]
    MessageTooLarge(String),

    /// Wire bytes are not a valid transaction.
    #[error("Malformed transaction: {0}")]
    Malformed(String),

    /// The wallet is not the signer the message requires.
    #[error("Signer mismatch: expected {expected}, got {got}")]
    SignerMismatch {
        /// Required signer
        expected: Pubkey,
        /// Wallet key
        got: Pubkey,
    },

    /// A signature does not verify against the message.
    #[error("Invalid signature for {signer}")]
    InvalidSignature {
        /// Offending signer
        signer: Pubkey,
    },

    /// The user or wallet declined to sign.
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    /// Transport failure talking to the network.
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Node message
        message: String,
    },

    /// The anchor expired before the transaction confirmed.
    #[error("Blockhash expired: block height {current} > last valid {last_valid_block_height}")]
    BlockhashExpired {
        /// Anchor limit
        last_valid_block_height: u64,
        /// Observed block height
        current: u64,
    },

    /// The settlement program rejected the transaction.
    #[error("Program rejected transaction: {0}")]
    Rejected(ErrorCode),

    /// The transaction failed with an error outside the settlement codes.
    #[error("Transaction failed: {message}")]
    TransactionFailed {
        /// Custom program code, if any
        code: Option<u32>,
        /// Raw failure description
        message: String,
    },
}

impl BuilderError {
    /// Whether retrying the same step may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Rpc { .. } | Self::BlockhashExpired { .. }
        )
    }

    /// Whether the error was raised before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIntent(_) | Self::Derivation(_) | Self::Codec(_) | Self::MessageTooLarge(_)
        )
    }

    /// Error for a failed transaction carrying an optional custom code.
    pub fn from_program_failure(code: Option<u32>, message: impl Into<String>) -> Self {
        match code.and_then(ErrorCode::from_u32) {
            Some(code) => Self::Rejected(code),
            None => Self::TransactionFailed {
                code,
                message: message.into(),
            },
        }
    }
}

impl From<SettlementError> for BuilderError {
    fn from(err: SettlementError) -> Self {
        Self::InvalidIntent(err.to_string())
    }
}

impl From<al_01_address_derivation::DerivationError> for BuilderError {
    fn from(err: al_01_address_derivation::DerivationError) -> Self {
        Self::Derivation(err.to_string())
    }
}

impl From<al_02_settlement::CodecError> for BuilderError {
    fn from(err: al_02_settlement::CodecError) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<reqwest::Error> for BuilderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
