//! # Domain Entities
//!
//! Ledger records and the receipts returned by committed operations.
//!
//! Field order of `Pool`, `NgoRecord` and `GlobalConfig` is the on-chain
//! account layout; do not reorder.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use shared_types::{
    hex_serde, DayIndex, EthAddress, Hash, Lamports, PoolId, Pubkey, UnixTimestamp,
};

/// Maximum pool name length in bytes.
pub const MAX_POOL_NAME_LEN: usize = 64;

/// Maximum number of pools in an NGO allow-list.
pub const MAX_ALLOWED_POOLS: usize = 16;

/// Maximum number of configured attesters.
pub const MAX_ATTESTERS: usize = 16;

/// CCTP domain of the primary chain.
pub const PRIMARY_CHAIN_DOMAIN: u32 = 5;

/// A named relief pool.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Pool {
    /// Natural key, immutable.
    pub id: PoolId,
    /// Display name.
    pub name: String,
    /// Lifetime credits (direct and bridged). Never decreases.
    pub total_donated: Lamports,
    /// Lifetime withdrawals. Never decreases.
    pub total_withdrawn: Lamports,
    /// Whether donations and withdrawals are accepted.
    pub is_active: bool,
    /// Derivation bump of the pool account.
    pub bump: u8,
}

impl Pool {
    /// Fresh, active, empty pool.
    pub fn new(id: PoolId, name: impl Into<String>, bump: u8) -> Self {
        Self {
            id,
            name: name.into(),
            total_donated: 0,
            total_withdrawn: 0,
            is_active: true,
            bump,
        }
    }

    /// Credited but not yet withdrawn.
    pub fn outstanding(&self) -> Lamports {
        self.total_donated.saturating_sub(self.total_withdrawn)
    }
}

/// Authorization record for one NGO wallet.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct NgoRecord {
    /// NGO wallet; primary key and the only valid withdrawal signer.
    pub wallet: Pubkey,
    /// Whether the NGO may withdraw at all.
    pub is_active: bool,
    /// Pools the NGO may draw from, deduplicated, in registration order.
    pub allowed_pools: Vec<PoolId>,
    /// Per-day ceiling across all pools.
    pub daily_limit: Lamports,
    /// Withdrawn on `last_withdraw_day`.
    pub withdrawn_today: Lamports,
    /// Day `withdrawn_today` refers to.
    pub last_withdraw_day: DayIndex,
    /// Derivation bump of the NGO account.
    pub bump: u8,
}

impl NgoRecord {
    /// Whether `pool_id` is in the allow-list.
    pub fn is_allowed(&self, pool_id: PoolId) -> bool {
        self.allowed_pools.contains(&pool_id)
    }

    /// Amount counted against the limit on `day`.
    ///
    /// Zero on any day other than `last_withdraw_day`; this is the read-side
    /// view of the rollover the engine applies when a withdrawal executes.
    pub fn withdrawn_on(&self, day: DayIndex) -> Lamports {
        if day == self.last_withdraw_day {
            self.withdrawn_today
        } else {
            0
        }
    }

    /// What is left of the daily limit on `day`.
    pub fn remaining_on(&self, day: DayIndex) -> Lamports {
        self.daily_limit.saturating_sub(self.withdrawn_on(day))
    }
}

/// Ledger-wide configuration singleton.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct GlobalConfig {
    /// Sole identity allowed to run admin operations.
    pub admin: Pubkey,
    /// Secondary-chain addresses whose signatures count toward attestation.
    pub attesters: Vec<EthAddress>,
    /// Distinct attester signatures required.
    pub attestation_threshold: u8,
    /// Domain bridged messages must target.
    pub local_domain: u32,
    /// Derivation bump of the config account.
    pub bump: u8,
}

impl GlobalConfig {
    /// Whether `signer` is the administrator.
    pub fn is_admin(&self, signer: &Pubkey) -> bool {
        self.admin == *signer
    }
}

/// Result of a direct donation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceipt {
    /// Credited pool.
    pub pool_id: PoolId,
    /// Donor wallet.
    pub donor: Pubkey,
    /// Amount moved.
    pub amount: Lamports,
    /// Ledger clock at execution.
    pub timestamp: UnixTimestamp,
    /// Pool total after the donation.
    pub total_donated: Lamports,
}

/// Result of an NGO withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Debited pool.
    pub pool_id: PoolId,
    /// Receiving NGO wallet.
    pub ngo_wallet: Pubkey,
    /// Amount moved.
    pub amount: Lamports,
    /// Ledger clock at execution.
    pub timestamp: UnixTimestamp,
    /// Accounting day of the withdrawal.
    pub day: DayIndex,
    /// NGO total for `day` after the withdrawal.
    pub withdrawn_today: Lamports,
    /// Limit left for `day`.
    pub remaining_today: Lamports,
    /// Pool lifetime withdrawals after the withdrawal.
    pub total_withdrawn: Lamports,
}

/// Result of crediting an attested cross-chain burn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgedCreditReceipt {
    /// Credited pool.
    pub pool_id: PoolId,
    /// Amount minted.
    pub amount: Lamports,
    /// Keccak-256 of the burn message.
    #[serde(with = "hex_serde")]
    pub message_hash: Hash,
    /// Source-domain nonce of the burn.
    pub nonce: u64,
    /// Source domain.
    pub source_domain: u32,
    /// Ledger clock at execution.
    pub timestamp: UnixTimestamp,
    /// Pool total after the credit.
    pub total_donated: Lamports,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ngo(day: DayIndex, withdrawn: Lamports) -> NgoRecord {
        NgoRecord {
            wallet: Pubkey::new([1u8; 32]),
            is_active: true,
            allowed_pools: vec![0, 2],
            daily_limit: 500,
            withdrawn_today: withdrawn,
            last_withdraw_day: day,
            bump: 255,
        }
    }

    #[test]
    fn test_new_pool_is_active_and_empty() {
        let pool = Pool::new(0, "Ukraine", 254);
        assert!(pool.is_active);
        assert_eq!(pool.total_donated, 0);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_allow_list() {
        let record = ngo(0, 0);
        assert!(record.is_allowed(2));
        assert!(!record.is_allowed(1));
    }

    #[test]
    fn test_remaining_resets_on_other_day() {
        let record = ngo(10, 500);
        assert_eq!(record.remaining_on(10), 0);
        assert_eq!(record.remaining_on(11), 500);
        assert_eq!(record.withdrawn_on(11), 0);
    }
}
