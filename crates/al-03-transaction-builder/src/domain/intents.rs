//! # Intents
//!
//! What a caller wants done, before any account is resolved. Intents are
//! validated locally so malformed requests never reach the network.

use crate::domain::errors::BuilderError;
use al_02_settlement::{MAX_ALLOWED_POOLS, MAX_ATTESTERS, MAX_POOL_NAME_LEN};
use serde::{Deserialize, Serialize};
use shared_crypto::RECOVERABLE_SIGNATURE_LEN;
use shared_types::{EthAddress, Lamports, PoolId, Pubkey};

/// A primary-chain ledger operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Create the configuration singleton.
    Initialize {
        /// Admin wallet, also the fee payer
        admin: Pubkey,
        /// Attester addresses
        attesters: Vec<EthAddress>,
        /// Required attester signatures
        threshold: u8,
        /// Domain of the primary chain
        local_domain: u32,
    },
    /// Create a pool.
    CreatePool {
        /// Admin wallet
        admin: Pubkey,
        /// New pool id
        pool_id: PoolId,
        /// Display name
        name: String,
    },
    /// Register or overwrite an NGO.
    RegisterNgo {
        /// Admin wallet
        admin: Pubkey,
        /// NGO wallet
        wallet: Pubkey,
        /// Pools the NGO may withdraw from
        allowed_pools: Vec<PoolId>,
        /// Daily withdrawal cap
        daily_limit: Lamports,
    },
    /// Activate or deactivate a pool.
    SetPoolActive {
        /// Admin wallet
        admin: Pubkey,
        /// Pool id
        pool_id: PoolId,
        /// New status
        active: bool,
    },
    /// Donate X to pool P.
    Donate {
        /// Donor wallet
        donor: Pubkey,
        /// Pool id
        pool_id: PoolId,
        /// Amount
        amount: Lamports,
    },
    /// Withdraw X as NGO N from pool P.
    Withdraw {
        /// NGO wallet, the only permitted signer
        ngo_wallet: Pubkey,
        /// Pool id
        pool_id: PoolId,
        /// Amount
        amount: Lamports,
    },
    /// Credit an attested burn to a pool.
    CreditBridged {
        /// Relayer paying the fee
        relayer: Pubkey,
        /// Destination pool
        pool_id: PoolId,
        /// Raw burn message
        message: Vec<u8>,
        /// Concatenated attester signatures
        attestation: Vec<u8>,
    },
}

impl Intent {
    /// Operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::CreatePool { .. } => "create_pool",
            Self::RegisterNgo { .. } => "register_ngo",
            Self::SetPoolActive { .. } => "set_pool_active",
            Self::Donate { .. } => "donate_to_pool",
            Self::Withdraw { .. } => "withdraw_from_pool",
            Self::CreditBridged { .. } => "credit_bridged_donation",
        }
    }

    /// Wallet that signs and pays the fee.
    pub fn fee_payer(&self) -> Pubkey {
        match self {
            Self::Initialize { admin, .. }
            | Self::CreatePool { admin, .. }
            | Self::RegisterNgo { admin, .. }
            | Self::SetPoolActive { admin, .. } => *admin,
            Self::Donate { donor, .. } => *donor,
            Self::Withdraw { ngo_wallet, .. } => *ngo_wallet,
            Self::CreditBridged { relayer, .. } => *relayer,
        }
    }

    /// Local checks that need no ledger state.
    pub fn validate(&self) -> Result<(), BuilderError> {
        match self {
            Self::Initialize {
                attesters,
                threshold,
                ..
            } => {
                if attesters.is_empty() || attesters.len() > MAX_ATTESTERS {
                    return invalid(format!(
                        "attester count {} outside 1..={MAX_ATTESTERS}",
                        attesters.len()
                    ));
                }
                if *threshold == 0 || usize::from(*threshold) > attesters.len() {
                    return invalid(format!(
                        "threshold {threshold} outside 1..={}",
                        attesters.len()
                    ));
                }
            }
            Self::CreatePool { name, .. } => {
                if name.len() > MAX_POOL_NAME_LEN {
                    return invalid(format!(
                        "pool name is {} bytes (max {MAX_POOL_NAME_LEN})",
                        name.len()
                    ));
                }
            }
            Self::RegisterNgo { allowed_pools, .. } => {
                if allowed_pools.len() > MAX_ALLOWED_POOLS {
                    return invalid(format!(
                        "{} allowed pools (max {MAX_ALLOWED_POOLS})",
                        allowed_pools.len()
                    ));
                }
            }
            Self::SetPoolActive { .. } => {}
            Self::Donate { amount, .. } | Self::Withdraw { amount, .. } => {
                if *amount == 0 {
                    return invalid("amount must be greater than zero".into());
                }
            }
            Self::CreditBridged {
                message,
                attestation,
                ..
            } => {
                if message.is_empty() {
                    return invalid("empty burn message".into());
                }
                if attestation.is_empty() || attestation.len() % RECOVERABLE_SIGNATURE_LEN != 0 {
                    return invalid(format!(
                        "attestation length {} is not a positive multiple of {RECOVERABLE_SIGNATURE_LEN}",
                        attestation.len()
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> Result<(), BuilderError> {
    Err(BuilderError::InvalidIntent(reason))
}

/// Bridge X from the secondary chain to pool P.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeIntent {
    /// Source-chain wallet that approves and burns.
    pub owner: EthAddress,
    /// Token amount (6-decimal USDC units).
    pub amount: u64,
    /// Primary-chain pool to credit.
    pub destination_pool: PoolId,
}

impl BridgeIntent {
    /// Local checks.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.amount == 0 {
            return invalid("bridge amount must be greater than zero".into());
        }
        if self.owner == EthAddress::default() {
            return invalid("bridge owner is the zero address".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amount_rejected_locally() {
        let intent = Intent::Donate {
            donor: Pubkey::new([1u8; 32]),
            pool_id: 0,
            amount: 0,
        };
        assert!(matches!(
            intent.validate(),
            Err(BuilderError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_fee_payer_is_the_signer() {
        let wallet = Pubkey::new([4u8; 32]);
        let intent = Intent::Withdraw {
            ngo_wallet: wallet,
            pool_id: 0,
            amount: 5,
        };
        assert_eq!(intent.fee_payer(), wallet);
        assert_eq!(intent.name(), "withdraw_from_pool");
    }

    #[test]
    fn test_threshold_bounds() {
        let intent = Intent::Initialize {
            admin: Pubkey::new([1u8; 32]),
            attesters: vec![EthAddress([1u8; 20])],
            threshold: 2,
            local_domain: 5,
        };
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_attestation_length_checked() {
        let intent = Intent::CreditBridged {
            relayer: Pubkey::new([1u8; 32]),
            pool_id: 0,
            message: vec![0u8; 248],
            attestation: vec![0u8; 64],
        };
        assert!(intent.validate().is_err());
    }
}
