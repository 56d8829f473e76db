//! # Core Domain Entities
//!
//! Identity types shared across the ledger.
//!
//! ## Clusters
//!
//! - **Primary chain**: `Pubkey` (32-byte account address), `Hash`
//! - **Secondary chain**: `EthAddress` (20-byte address)
//! - **Accounting**: `PoolId`, `Lamports`, `UnixTimestamp`, `DayIndex`

use crate::errors::ParseError;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ACCOUNTING ALIASES
// =============================================================================

/// A 32-byte hash (SHA-256 or Keccak-256).
pub type Hash = [u8; 32];

/// Natural key of a relief pool.
pub type PoolId = u64;

/// Amount in the ledger's smallest unit.
pub type Lamports = u64;

/// Seconds since the Unix epoch, as reported by the ledger clock.
pub type UnixTimestamp = i64;

/// Whole days since the Unix epoch.
pub type DayIndex = i64;

/// Length of one accounting day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Map a timestamp onto its accounting day.
///
/// Uses floor division so timestamps before the epoch land on negative days
/// instead of collapsing onto day zero.
#[must_use]
pub fn day_index(timestamp: UnixTimestamp) -> DayIndex {
    timestamp.div_euclid(SECONDS_PER_DAY)
}

// =============================================================================
// PRIMARY CHAIN IDENTITY
// =============================================================================

/// A 32-byte account address on the primary chain.
///
/// Wallets are Ed25519 public keys; program-derived accounts are off-curve
/// hashes. Both share this representation.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    /// Width of an address in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Copy of the raw bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Build from a slice, checking the width.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            expected: Self::LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl FromStr for Pubkey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ParseError::InvalidBase58(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SECONDARY CHAIN IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style address.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct EthAddress(pub [u8; 20]);

impl EthAddress {
    /// Width of an address in bytes.
    pub const LEN: usize = 20;

    /// Left-pad to the 32-byte form used in cross-chain messages.
    #[must_use]
    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[12..].copy_from_slice(&self.0);
        out
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({self})")
    }
}

impl FromStr for EthAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseError::InvalidLength {
                expected: Self::LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl Serialize for EthAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Render a byte string as `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse `0x`-prefixed (or bare) hex into bytes.
pub fn from_hex_prefixed(s: &str) -> Result<Vec<u8>, ParseError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| ParseError::InvalidHex(e.to_string()))
}

/// Serde adapter storing byte strings (and fixed arrays) as `0x` hex.
///
/// Use with `#[serde(with = "shared_types::hex_serde")]`.
pub mod hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a hex string.
    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&super::to_hex_prefixed(value.as_ref()))
    }

    /// Deserialize bytes from a hex string.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<Vec<u8>>,
    {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        let bytes = super::from_hex_prefixed(&s).map_err(serde::de::Error::custom)?;
        let len = bytes.len();
        T::try_from(bytes)
            .map_err(|_| serde::de::Error::custom(format!("unexpected byte length {len}")))
    }
}

/// Serde adapter for optional byte strings stored as `0x` hex or `null`.
///
/// Use with `#[serde(with = "shared_types::hex_serde_opt", default)]`.
pub mod hex_serde_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize optional bytes.
    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        value
            .as_ref()
            .map(|v| super::to_hex_prefixed(v.as_ref()))
            .serialize(serializer)
    }

    /// Deserialize optional bytes.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<Vec<u8>>,
    {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let bytes = super::from_hex_prefixed(&s).map_err(serde::de::Error::custom)?;
        let len = bytes.len();
        T::try_from(bytes)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("unexpected byte length {len}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_index_floor_division() {
        assert_eq!(day_index(0), 0);
        assert_eq!(day_index(86_399), 0);
        assert_eq!(day_index(86_400), 1);
        assert_eq!(day_index(-1), -1);
    }

    #[test]
    fn test_pubkey_base58_roundtrip() {
        let key = Pubkey::new([7u8; 32]);
        let text = key.to_string();
        let parsed: Pubkey = text.parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_known_program_id_parses() {
        let id: Pubkey = "BCm48SATqUi4zUCgYav4KGgnpDqg1tnsLfw7i4HwGE3J".parse().unwrap();
        assert_eq!(id.to_string(), "BCm48SATqUi4zUCgYav4KGgnpDqg1tnsLfw7i4HwGE3J");
    }

    #[test]
    fn test_pubkey_rejects_short_input() {
        let short = bs58::encode([1u8; 31]).into_string();
        let err = short.parse::<Pubkey>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 32,
                got: 31
            }
        );
    }

    #[test]
    fn test_eth_address_padding() {
        let addr: EthAddress = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".parse().unwrap();
        let padded = addr.to_bytes32();
        assert_eq!(&padded[..12], &[0u8; 12]);
        assert_eq!(&padded[12..], &addr.0);
        assert_eq!(
            addr.to_string(),
            "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238"
        );
    }

    #[test]
    fn test_pubkey_serde_as_string() {
        let key = Pubkey::new([9u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{key}\""));
        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_hex_serde_fixed_array() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "hex_serde")]
            hash: Hash,
        }

        let json = serde_json::to_string(&Wrapper { hash: [0xab; 32] }).unwrap();
        assert!(json.contains("0xabab"));
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash, [0xab; 32]);
    }
}
