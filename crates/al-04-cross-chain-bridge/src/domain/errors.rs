//! # Domain Errors
//!
//! Error types for the bridge orchestrator.

use super::value_objects::{BridgeState, SessionId};
use al_03_transaction_builder::BuilderError;
use shared_types::Hash;
use thiserror::Error;

/// Bridge error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Request rejected before anything was sent.
    #[error("Invalid bridge request: {0}")]
    InvalidRequest(String),

    /// No session with this id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// No session for this burn identifier.
    #[error("No session for burn 0x{}", hex::encode(.0))]
    BurnNotFound(Hash),

    /// Another task is already driving the session.
    #[error("Session busy: {0}")]
    SessionBusy(SessionId),

    /// The burn has been submitted; the session can only be resumed.
    #[error("Cannot cancel session {0} after the burn")]
    CannotCancelAfterBurn(SessionId),

    /// State machine violation.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: BridgeState,
        /// Attempted state
        to: BridgeState,
    },

    /// Session is in a state the operation does not apply to.
    #[error("Session {id} is {state}")]
    WrongState {
        /// Session id
        id: SessionId,
        /// Current state
        state: BridgeState,
    },

    /// Source-chain wallet or node failure.
    #[error("Source chain error: {0}")]
    SourceChain(String),

    /// A source-chain transaction reverted.
    #[error("Source transaction reverted: 0x{}", hex::encode(.0))]
    Reverted(Hash),

    /// The burn receipt carried no cross-chain message.
    #[error("No MessageSent log in burn receipt")]
    MissingMessage,

    /// Attestation service failure.
    #[error("Attestation service error: {0}")]
    Attestation(String),

    /// Relay transport failure.
    #[error("Relay error: {0}")]
    Relay(String),

    /// The ledger refused the credit.
    #[error("Relay rejected: {0}")]
    RelayRejected(String),

    /// Session persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Building the source-chain calls failed.
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),
}

impl BridgeError {
    /// Whether retrying the same step may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SourceChain(_) | Self::Attestation(_) | Self::Relay(_) | Self::SessionBusy(_)
        )
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
