//! # Account Layouts
//!
//! `8-byte type tag || borsh(record)`. Tags are the first eight bytes of
//! `sha256("account:<Name>")`, except `Ngo`, which keeps the tag of the
//! deployed program's interface.

use super::CodecError;
use crate::domain::{GlobalConfig, NgoRecord, Pool};
use borsh::{BorshDeserialize, BorshSerialize};

/// Type tag of pool accounts.
pub const POOL_DISCRIMINATOR: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];

/// Type tag of NGO accounts.
pub const NGO_DISCRIMINATOR: [u8; 8] = [138, 32, 44, 252, 51, 112, 87, 39];

/// Type tag of the configuration account.
pub const CONFIG_DISCRIMINATOR: [u8; 8] = [149, 8, 156, 202, 160, 252, 176, 217];

/// A record stored in a tagged program account.
pub trait AccountRecord: BorshSerialize + BorshDeserialize {
    /// Leading type tag.
    const DISCRIMINATOR: [u8; 8];
    /// Record name for diagnostics.
    const NAME: &'static str;
}

impl AccountRecord for Pool {
    const DISCRIMINATOR: [u8; 8] = POOL_DISCRIMINATOR;
    const NAME: &'static str = "Pool";
}

impl AccountRecord for NgoRecord {
    const DISCRIMINATOR: [u8; 8] = NGO_DISCRIMINATOR;
    const NAME: &'static str = "Ngo";
}

impl AccountRecord for GlobalConfig {
    const DISCRIMINATOR: [u8; 8] = CONFIG_DISCRIMINATOR;
    const NAME: &'static str = "GlobalConfig";
}

/// Serialize a record into account data.
pub fn encode_account<T: AccountRecord>(record: &T) -> Result<Vec<u8>, CodecError> {
    let mut out = T::DISCRIMINATOR.to_vec();
    record
        .serialize(&mut out)
        .map_err(|e| CodecError::Borsh(e.to_string()))?;
    Ok(out)
}

/// Parse account data, checking the type tag.
///
/// Trailing bytes after the record are ignored; accounts are allocated at
/// their maximum size.
pub fn decode_account<T: AccountRecord>(data: &[u8]) -> Result<T, CodecError> {
    if data.len() < 8 {
        return Err(CodecError::TooShort {
            needed: 8,
            got: data.len(),
        });
    }
    if data[..8] != T::DISCRIMINATOR {
        return Err(CodecError::DiscriminatorMismatch { expected: T::NAME });
    }
    let mut rest = &data[8..];
    T::deserialize(&mut rest).map_err(|e| CodecError::Borsh(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha256;
    use shared_types::Pubkey;

    #[test]
    fn test_tags_match_hash_convention() {
        assert_eq!(sha256(b"account:Pool")[..8], POOL_DISCRIMINATOR);
        assert_eq!(sha256(b"account:GlobalConfig")[..8], CONFIG_DISCRIMINATOR);
    }

    #[test]
    fn test_pool_layout() {
        let pool = Pool {
            id: 1,
            name: "Gaza".to_string(),
            total_donated: 2000,
            total_withdrawn: 500,
            is_active: true,
            bump: 253,
        };
        let data = encode_account(&pool).unwrap();

        assert_eq!(&data[..8], &POOL_DISCRIMINATOR);
        assert_eq!(&data[8..16], &1u64.to_le_bytes());
        assert_eq!(&data[16..20], &4u32.to_le_bytes());
        assert_eq!(&data[20..24], b"Gaza");
        assert_eq!(&data[24..32], &2000u64.to_le_bytes());
        assert_eq!(&data[32..40], &500u64.to_le_bytes());
        assert_eq!(data[40], 1);
        assert_eq!(data[41], 253);
        assert_eq!(data.len(), 42);
    }

    #[test]
    fn test_ngo_decode_ignores_trailing_space() {
        let ngo = NgoRecord {
            wallet: Pubkey::new([9u8; 32]),
            is_active: true,
            allowed_pools: vec![0, 2],
            daily_limit: 500,
            withdrawn_today: 0,
            last_withdraw_day: 20_000,
            bump: 254,
        };
        let mut data = encode_account(&ngo).unwrap();
        data.extend_from_slice(&[0u8; 64]);
        assert_eq!(decode_account::<NgoRecord>(&data).unwrap(), ngo);
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let data = encode_account(&Pool::new(0, "x", 255)).unwrap();
        assert_eq!(
            decode_account::<NgoRecord>(&data),
            Err(CodecError::DiscriminatorMismatch { expected: "Ngo" })
        );
        assert!(matches!(
            decode_account::<Pool>(&data[..4]),
            Err(CodecError::TooShort { needed: 8, got: 4 })
        ));
    }
}
