//! # Ledger Events
//!
//! Every state change the settlement engine commits, and every bridge
//! session transition, is announced on the bus as a `LedgerEvent`.

use serde::{Deserialize, Serialize};
use shared_types::{hex_serde, Hash, Lamports, PoolId, Pubkey, UnixTimestamp};
use uuid::Uuid;

/// Committed ledger and bridge state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // COMPONENT 2: SETTLEMENT
    // =========================================================================
    /// Global configuration was created.
    ConfigInitialized {
        /// Administrator identity.
        admin: Pubkey,
        /// Number of configured attesters.
        attester_count: usize,
        /// Signatures required per attestation.
        threshold: u8,
    },

    /// A relief pool was created.
    PoolCreated {
        /// Pool id.
        pool_id: PoolId,
        /// Display name.
        name: String,
        /// Derived pool account.
        address: Pubkey,
    },

    /// A pool was deactivated or reactivated.
    PoolStatusChanged {
        /// Pool id.
        pool_id: PoolId,
        /// New status.
        is_active: bool,
    },

    /// A donor funded a pool directly.
    DonationReceived {
        /// Pool id.
        pool_id: PoolId,
        /// Donor wallet.
        donor: Pubkey,
        /// Amount credited.
        amount: Lamports,
        /// Ledger clock at execution.
        timestamp: UnixTimestamp,
    },

    /// An NGO record was created or overwritten.
    NgoRegistered {
        /// NGO wallet.
        wallet: Pubkey,
        /// Pools the NGO may draw from.
        allowed_pools: Vec<PoolId>,
        /// Per-day withdrawal ceiling.
        daily_limit: Lamports,
    },

    /// An NGO withdrew from a pool.
    WithdrawalExecuted {
        /// Pool id.
        pool_id: PoolId,
        /// Receiving NGO wallet.
        ngo_wallet: Pubkey,
        /// Amount paid out.
        amount: Lamports,
        /// Ledger clock at execution.
        timestamp: UnixTimestamp,
        /// NGO total for the current day after this withdrawal.
        withdrawn_today: Lamports,
    },

    /// An attested cross-chain burn was credited to a pool.
    BridgedDonationCredited {
        /// Pool id.
        pool_id: PoolId,
        /// Amount minted into the pool.
        amount: Lamports,
        /// Keccak-256 of the burn message (the burn identifier).
        #[serde(with = "hex_serde")]
        message_hash: Hash,
        /// Source-domain nonce.
        nonce: u64,
        /// Source domain.
        source_domain: u32,
        /// Ledger clock at execution.
        timestamp: UnixTimestamp,
    },

    /// An operation was rejected by the settlement engine.
    OperationRejected {
        /// Operation name.
        operation: String,
        /// Stable numeric error code.
        code: u32,
        /// Human-readable reason.
        reason: String,
    },

    // =========================================================================
    // COMPONENT 4: CROSS-CHAIN BRIDGE
    // =========================================================================
    /// A bridge session moved to a new state.
    BridgeSessionUpdated {
        /// Session id.
        session_id: Uuid,
        /// New state name.
        state: String,
        /// Destination pool.
        destination_pool: PoolId,
        /// Bridged amount.
        amount: Lamports,
        /// Burn identifier once known.
        #[serde(with = "shared_types::hex_serde_opt", default)]
        burn_id: Option<Hash>,
    },
}

impl LedgerEvent {
    /// Topic subscribers filter on.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ConfigInitialized { .. }
            | Self::PoolCreated { .. }
            | Self::PoolStatusChanged { .. } => EventTopic::Pools,
            Self::DonationReceived { .. } | Self::BridgedDonationCredited { .. } => {
                EventTopic::Donations
            }
            Self::NgoRegistered { .. } => EventTopic::Registry,
            Self::WithdrawalExecuted { .. } => EventTopic::Withdrawals,
            Self::OperationRejected { .. } => EventTopic::Rejections,
            Self::BridgeSessionUpdated { .. } => EventTopic::Bridge,
        }
    }

    /// Get the originating component id.
    #[must_use]
    pub fn source_component(&self) -> u8 {
        match self {
            Self::BridgeSessionUpdated { .. } => 4,
            _ => 2,
        }
    }

    /// Pool this event concerns, if any.
    #[must_use]
    pub fn pool_id(&self) -> Option<PoolId> {
        match self {
            Self::PoolCreated { pool_id, .. }
            | Self::PoolStatusChanged { pool_id, .. }
            | Self::DonationReceived { pool_id, .. }
            | Self::WithdrawalExecuted { pool_id, .. }
            | Self::BridgedDonationCredited { pool_id, .. } => Some(*pool_id),
            Self::BridgeSessionUpdated {
                destination_pool, ..
            } => Some(*destination_pool),
            _ => None,
        }
    }
}

/// Coarse event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Pool lifecycle and configuration.
    Pools,
    /// Direct and bridged donations.
    Donations,
    /// NGO withdrawals.
    Withdrawals,
    /// NGO registry changes.
    Registry,
    /// Rejected operations.
    Rejections,
    /// Bridge session transitions.
    Bridge,
    /// Wildcard.
    All,
}

/// Topic and pool selection applied by a subscription.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Accepted topics; empty accepts every topic.
    pub topics: Vec<EventTopic>,
    /// Pools to include. Empty means all pools (and pool-less events).
    pub pool_ids: Vec<PoolId>,
}

impl EventFilter {
    /// Accept everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept the listed topics from any pool.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            pool_ids: Vec::new(),
        }
    }

    /// Restrict to events about the given pools.
    #[must_use]
    pub fn for_pools(mut self, pool_ids: Vec<PoolId>) -> Self {
        self.pool_ids = pool_ids;
        self
    }

    /// Whether a subscription with this filter delivers `event`.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let pool_match = self.pool_ids.is_empty()
            || event
                .pool_id()
                .map(|id| self.pool_ids.contains(&id))
                .unwrap_or(false);

        topic_match && pool_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(pool_id: PoolId) -> LedgerEvent {
        LedgerEvent::DonationReceived {
            pool_id,
            donor: Pubkey::new([1u8; 32]),
            amount: 1000,
            timestamp: 0,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(donation(0).topic(), EventTopic::Donations);
        assert_eq!(donation(0).source_component(), 2);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&donation(3)));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Withdrawals]);
        assert!(!filter.matches(&donation(0)));
    }

    #[test]
    fn test_filter_by_pool() {
        let filter = EventFilter::all().for_pools(vec![1]);
        assert!(filter.matches(&donation(1)));
        assert!(!filter.matches(&donation(2)));

        let registered = LedgerEvent::NgoRegistered {
            wallet: Pubkey::default(),
            allowed_pools: vec![1],
            daily_limit: 5,
        };
        assert!(!filter.matches(&registered));
    }

    #[test]
    fn test_bridge_event_json_uses_hex_burn_id() {
        let event = LedgerEvent::BridgeSessionUpdated {
            session_id: Uuid::nil(),
            state: "Stuck".to_string(),
            destination_pool: 0,
            amount: 100,
            burn_id: Some([0x11; 32]),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("0x1111"));
        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.source_component(), 4);
    }
}
