//! # Instruction Wire Format
//!
//! `8-byte discriminator || borsh(args)`. Discriminators are the first
//! eight bytes of `sha256("global:<snake_case_name>")`.

use super::CodecError;
use borsh::BorshDeserialize;
use shared_types::{EthAddress, Lamports, PoolId};

/// `initialize`
pub const INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
/// `create_pool`
pub const CREATE_POOL: [u8; 8] = [233, 146, 209, 142, 207, 104, 64, 188];
/// `donate_to_pool`
pub const DONATE_TO_POOL: [u8; 8] = [219, 179, 202, 183, 26, 49, 206, 250];
/// `register_ngo`
pub const REGISTER_NGO: [u8; 8] = [5, 168, 204, 75, 108, 93, 89, 244];
/// `withdraw_from_pool`
pub const WITHDRAW_FROM_POOL: [u8; 8] = [62, 33, 128, 81, 40, 234, 29, 77];
/// `set_pool_active`
pub const SET_POOL_ACTIVE: [u8; 8] = [111, 72, 142, 244, 144, 35, 116, 197];
/// `credit_bridged_donation`
pub const CREDIT_BRIDGED_DONATION: [u8; 8] = [238, 189, 75, 139, 103, 148, 43, 154];

/// Decoded program instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerInstruction {
    /// Create the configuration singleton.
    Initialize {
        /// Attester addresses
        attesters: Vec<EthAddress>,
        /// Required signatures
        threshold: u8,
        /// Domain bridged messages must target
        local_domain: u32,
    },
    /// Create a pool.
    CreatePool {
        /// Pool id
        id: PoolId,
        /// Display name
        name: String,
    },
    /// Donate to the pool passed as an account.
    DonateToPool {
        /// Amount
        amount: Lamports,
    },
    /// Register or overwrite the NGO passed as an account.
    RegisterNgo {
        /// Allow-list
        allowed_pools: Vec<PoolId>,
        /// Daily limit
        daily_limit: Lamports,
    },
    /// Withdraw from the pool passed as an account.
    WithdrawFromPool {
        /// Amount
        amount: Lamports,
    },
    /// Activate or deactivate the pool passed as an account.
    SetPoolActive {
        /// New status
        active: bool,
    },
    /// Credit an attested burn to the pool passed as an account.
    CreditBridgedDonation {
        /// Raw burn message
        message: Vec<u8>,
        /// Concatenated attester signatures
        attestation: Vec<u8>,
    },
}

impl LedgerInstruction {
    /// Wire discriminator.
    pub fn discriminator(&self) -> [u8; 8] {
        match self {
            Self::Initialize { .. } => INITIALIZE,
            Self::CreatePool { .. } => CREATE_POOL,
            Self::DonateToPool { .. } => DONATE_TO_POOL,
            Self::RegisterNgo { .. } => REGISTER_NGO,
            Self::WithdrawFromPool { .. } => WITHDRAW_FROM_POOL,
            Self::SetPoolActive { .. } => SET_POOL_ACTIVE,
            Self::CreditBridgedDonation { .. } => CREDIT_BRIDGED_DONATION,
        }
    }

    /// Snake-case instruction name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::CreatePool { .. } => "create_pool",
            Self::DonateToPool { .. } => "donate_to_pool",
            Self::RegisterNgo { .. } => "register_ngo",
            Self::WithdrawFromPool { .. } => "withdraw_from_pool",
            Self::SetPoolActive { .. } => "set_pool_active",
            Self::CreditBridgedDonation { .. } => "credit_bridged_donation",
        }
    }

    /// Encode to instruction data.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = self.discriminator().to_vec();
        let written = match self {
            Self::Initialize {
                attesters,
                threshold,
                local_domain,
            } => borsh::to_writer(&mut out, &(attesters, threshold, local_domain)),
            Self::CreatePool { id, name } => borsh::to_writer(&mut out, &(id, name)),
            Self::DonateToPool { amount } | Self::WithdrawFromPool { amount } => {
                borsh::to_writer(&mut out, amount)
            }
            Self::RegisterNgo {
                allowed_pools,
                daily_limit,
            } => borsh::to_writer(&mut out, &(allowed_pools, daily_limit)),
            Self::SetPoolActive { active } => borsh::to_writer(&mut out, active),
            Self::CreditBridgedDonation {
                message,
                attestation,
            } => borsh::to_writer(&mut out, &(message, attestation)),
        };
        written.map_err(|e| CodecError::Borsh(e.to_string()))?;
        Ok(out)
    }

    /// Decode instruction data. Trailing bytes are rejected.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < 8 {
            return Err(CodecError::TooShort {
                needed: 8,
                got: data.len(),
            });
        }
        let mut tag = [0u8; 8];
        tag.copy_from_slice(&data[..8]);
        let args = &data[8..];

        let ix = match tag {
            INITIALIZE => {
                let (attesters, threshold, local_domain) = parse(args)?;
                Self::Initialize {
                    attesters,
                    threshold,
                    local_domain,
                }
            }
            CREATE_POOL => {
                let (id, name) = parse(args)?;
                Self::CreatePool { id, name }
            }
            DONATE_TO_POOL => Self::DonateToPool {
                amount: parse(args)?,
            },
            REGISTER_NGO => {
                let (allowed_pools, daily_limit) = parse(args)?;
                Self::RegisterNgo {
                    allowed_pools,
                    daily_limit,
                }
            }
            WITHDRAW_FROM_POOL => Self::WithdrawFromPool {
                amount: parse(args)?,
            },
            SET_POOL_ACTIVE => Self::SetPoolActive {
                active: parse(args)?,
            },
            CREDIT_BRIDGED_DONATION => {
                let (message, attestation) = parse(args)?;
                Self::CreditBridgedDonation {
                    message,
                    attestation,
                }
            }
            other => return Err(CodecError::UnknownInstruction(other)),
        };
        Ok(ix)
    }
}

fn parse<T: BorshDeserialize>(args: &[u8]) -> Result<T, CodecError> {
    borsh::from_slice(args).map_err(|e| CodecError::Borsh(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha256;

    #[test]
    fn test_discriminators_follow_hash_convention() {
        let table: [(&str, [u8; 8]); 7] = [
            ("initialize", INITIALIZE),
            ("create_pool", CREATE_POOL),
            ("donate_to_pool", DONATE_TO_POOL),
            ("register_ngo", REGISTER_NGO),
            ("withdraw_from_pool", WITHDRAW_FROM_POOL),
            ("set_pool_active", SET_POOL_ACTIVE),
            ("credit_bridged_donation", CREDIT_BRIDGED_DONATION),
        ];
        for (name, disc) in table {
            let preimage = format!("global:{name}");
            assert_eq!(sha256(preimage.as_bytes())[..8], disc, "{name}");
        }
    }

    #[test]
    fn test_donate_wire_bytes() {
        let data = LedgerInstruction::DonateToPool { amount: 1000 }
            .encode()
            .unwrap();
        assert_eq!(hex::encode(&data), "dbb3cab71a31cefae803000000000000");
    }

    #[test]
    fn test_register_ngo_wire_layout() {
        let data = LedgerInstruction::RegisterNgo {
            allowed_pools: vec![0, 2],
            daily_limit: 500,
        }
        .encode()
        .unwrap();
        assert_eq!(&data[..8], &REGISTER_NGO);
        assert_eq!(&data[8..12], &2u32.to_le_bytes());
        assert_eq!(&data[12..20], &0u64.to_le_bytes());
        assert_eq!(&data[20..28], &2u64.to_le_bytes());
        assert_eq!(&data[28..36], &500u64.to_le_bytes());
    }

    #[test]
    fn test_create_pool_decodes() {
        let ix = LedgerInstruction::CreatePool {
            id: 0,
            name: "Ukraine Humanitarian Fund".to_string(),
        };
        let data = ix.encode().unwrap();
        assert_eq!(LedgerInstruction::decode(&data).unwrap(), ix);
        assert_eq!(ix.name(), "create_pool");
    }

    #[test]
    fn test_decode_rejects_unknown_and_trailing() {
        assert!(matches!(
            LedgerInstruction::decode(&[0u8; 16]),
            Err(CodecError::UnknownInstruction(_))
        ));

        let mut data = LedgerInstruction::WithdrawFromPool { amount: 1 }
            .encode()
            .unwrap();
        data.push(0);
        assert!(matches!(
            LedgerInstruction::decode(&data),
            Err(CodecError::Borsh(_))
        ));
    }
}
