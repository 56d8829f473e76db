//! # Domain Entities
//!
//! The persisted bridge session. Everything needed to resume after a
//! restart lives here: the burn transaction, the message, its identifier and
//! any attestation already obtained.

use super::errors::BridgeError;
use super::value_objects::{BridgeRequest, BridgeState, SessionId, TxHash};
use serde::{Deserialize, Serialize};
use shared_types::Hash;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// One bridge transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSession {
    /// Session id.
    pub id: SessionId,
    /// What was asked for.
    pub request: BridgeRequest,
    /// Current state.
    pub state: BridgeState,
    /// Approval transaction.
    #[serde(with = "shared_types::hex_serde_opt", default)]
    pub approve_tx: Option<TxHash>,
    /// Burn transaction, recorded before its receipt is awaited.
    #[serde(with = "shared_types::hex_serde_opt", default)]
    pub burn_tx: Option<TxHash>,
    /// Cross-chain message emitted by the burn.
    #[serde(with = "shared_types::hex_serde_opt", default)]
    pub message: Option<Vec<u8>>,
    /// Keccak-256 of the message.
    #[serde(with = "shared_types::hex_serde_opt", default)]
    pub burn_id: Option<Hash>,
    /// Concatenated attester signatures.
    #[serde(with = "shared_types::hex_serde_opt", default)]
    pub attestation: Option<Vec<u8>>,
    /// Polls made in the current wait.
    pub attempts: u32,
    /// Whether the credit was already applied before the final relay.
    #[serde(default)]
    pub already_credited: bool,
    /// Last error seen.
    #[serde(default)]
    pub last_error: Option<String>,
    /// Unix seconds at creation.
    pub created_at: u64,
    /// Unix seconds at the last change.
    pub updated_at: u64,
}

impl BridgeSession {
    /// New idle session.
    pub fn new(request: BridgeRequest) -> Self {
        let now = unix_now();
        Self {
            id: Uuid::new_v4(),
            request,
            state: BridgeState::Idle,
            approve_tx: None,
            burn_tx: None,
            message: None,
            burn_id: None,
            attestation: None,
            attempts: 0,
            already_credited: false,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, enforcing the state machine.
    pub fn transition_to(&mut self, next: BridgeState) -> Result<(), BridgeError> {
        if !self.state.can_transition_to(next) {
            return Err(BridgeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.updated_at = unix_now();
        Ok(())
    }

    /// Record an error and move to `next`.
    pub fn fail_to(&mut self, next: BridgeState, error: &BridgeError) -> Result<(), BridgeError> {
        self.last_error = Some(error.to_string());
        self.transition_to(next)
    }

    /// Whether value has (or may have) left the source chain.
    pub fn is_burned(&self) -> bool {
        self.burn_tx.is_some()
    }

    /// State to re-enter when resuming a stuck session.
    pub fn resume_state(&self) -> BridgeState {
        if self.attestation.is_some() {
            BridgeState::Attested
        } else if self.burn_id.is_some() {
            BridgeState::AwaitingAttestation
        } else {
            BridgeState::Burning
        }
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::EthAddress;

    fn request() -> BridgeRequest {
        BridgeRequest {
            owner: EthAddress([1u8; 20]),
            amount: 100,
            destination_pool: 0,
        }
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut session = BridgeSession::new(request());
        let err = session.transition_to(BridgeState::Relayed).unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidTransition {
                from: BridgeState::Idle,
                to: BridgeState::Relayed
            }
        );
        assert_eq!(session.state, BridgeState::Idle);
    }

    #[test]
    fn test_resume_state_follows_progress() {
        let mut session = BridgeSession::new(request());
        session.burn_tx = Some([1u8; 32]);
        assert_eq!(session.resume_state(), BridgeState::Burning);
        session.burn_id = Some([2u8; 32]);
        assert_eq!(session.resume_state(), BridgeState::AwaitingAttestation);
        session.attestation = Some(vec![0u8; 65]);
        assert_eq!(session.resume_state(), BridgeState::Attested);
    }

    #[test]
    fn test_json_round_trip_keeps_bytes() {
        let mut session = BridgeSession::new(request());
        session.burn_id = Some([0xAB; 32]);
        session.message = Some(vec![1, 2, 3]);
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("0xabab"));
        let back: BridgeSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
