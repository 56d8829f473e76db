//! # Value Objects
//!
//! Session states, requests and polling policy.

use serde::{Deserialize, Serialize};
use shared_types::{EthAddress, PoolId};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Session identifier.
pub type SessionId = Uuid;

/// Default delay between attestation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of attestation polls before a session is parked as stuck.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 90;

/// Bridge session state.
///
/// ```text
/// Idle → Approving → Burning → AwaitingAttestation → Attested → Relayed
///   │        │          │  │            │                │
///   └────────┴──→ Failed│  └────→ Stuck ←───────────────┘
///                       └────────→ Stuck → AwaitingAttestation (resume)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeState {
    /// Created, nothing sent.
    #[default]
    Idle,
    /// Approval submitted, awaiting its receipt.
    Approving,
    /// Burn submitted, awaiting its receipt.
    Burning,
    /// Burn confirmed, polling for the attestation.
    AwaitingAttestation,
    /// Attestation held, credit not yet issued.
    Attested,
    /// Pool credited.
    Relayed,
    /// Aborted before the burn; nothing left the source chain.
    Failed,
    /// Burn committed but the session could not finish; resumable.
    Stuck,
}

impl BridgeState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: BridgeState) -> bool {
        use BridgeState::*;
        matches!(
            (self, next),
            (Idle, Approving)
                | (Idle, Failed)
                | (Approving, Burning)
                | (Approving, Failed)
                | (Burning, AwaitingAttestation)
                | (Burning, Failed)
                | (Burning, Stuck)
                | (AwaitingAttestation, Attested)
                | (AwaitingAttestation, Stuck)
                | (Attested, Relayed)
                | (Attested, Stuck)
                | (Stuck, Burning)
                | (Stuck, AwaitingAttestation)
                | (Stuck, Attested)
        )
    }

    /// No further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Relayed | Self::Failed)
    }

    /// Whether the source chain may already hold a burn.
    pub fn is_post_burn(&self) -> bool {
        matches!(
            self,
            Self::Burning | Self::AwaitingAttestation | Self::Attested | Self::Relayed | Self::Stuck
        )
    }

    /// Metric and event label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Approving => "Approving",
            Self::Burning => "Burning",
            Self::AwaitingAttestation => "AwaitingAttestation",
            Self::Attested => "Attested",
            Self::Relayed => "Relayed",
            Self::Failed => "Failed",
            Self::Stuck => "Stuck",
        }
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bridge X from a source-chain wallet to pool P.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// Source-chain wallet.
    pub owner: EthAddress,
    /// USDC base units (6 decimals).
    pub amount: u64,
    /// Pool to credit.
    pub destination_pool: PoolId,
}

/// Attestation polling bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgePolicy {
    /// Delay between polls.
    pub poll_interval: Duration,
    /// Polls before parking the session as stuck.
    pub max_attempts: u32,
}

impl Default for BridgePolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Source-chain transaction hash.
pub type TxHash = shared_types::Hash;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            BridgeState::Idle,
            BridgeState::Approving,
            BridgeState::Burning,
            BridgeState::AwaitingAttestation,
            BridgeState::Attested,
            BridgeState::Relayed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(BridgeState::Relayed.is_terminal());
    }

    #[test]
    fn test_no_failure_after_attestation_wait_starts() {
        assert!(!BridgeState::AwaitingAttestation.can_transition_to(BridgeState::Failed));
        assert!(!BridgeState::Attested.can_transition_to(BridgeState::Failed));
        assert!(!BridgeState::Stuck.can_transition_to(BridgeState::Failed));
        assert!(!BridgeState::Stuck.is_terminal());
    }

    #[test]
    fn test_stuck_resumes_into_polling() {
        assert!(BridgeState::AwaitingAttestation.can_transition_to(BridgeState::Stuck));
        assert!(BridgeState::Stuck.can_transition_to(BridgeState::AwaitingAttestation));
        assert!(!BridgeState::Relayed.can_transition_to(BridgeState::AwaitingAttestation));
    }
}
