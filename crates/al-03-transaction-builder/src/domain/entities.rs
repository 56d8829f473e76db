//! # Network-Facing Entities
//!
//! Liveness anchors, commitment levels, signature statuses and fetched
//! accounts as reported by the primary chain.

use serde::{Deserialize, Serialize};
use shared_crypto::Ed25519Signature;
use shared_types::{Hash, Lamports, Pubkey};
use std::fmt;
use std::str::FromStr;

/// Confirmation depth of a transaction.
///
/// Ordered: `Processed < Confirmed < Finalized`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Seen by the node, may still be rolled back.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted, cannot be rolled back.
    Finalized,
}

impl Commitment {
    /// Wire name used by JSON-RPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(format!("unknown commitment: {other}")),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recent blockhash plus the last block height at which it is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessAnchor {
    /// Recent blockhash embedded in the message.
    pub blockhash: Hash,
    /// Transaction expires once the chain passes this height.
    pub last_valid_block_height: u64,
}

impl LivenessAnchor {
    /// Whether the anchor has expired at `block_height`.
    pub fn is_expired_at(&self, block_height: u64) -> bool {
        block_height > self.last_valid_block_height
    }
}

/// Transaction id: the fee payer's signature, shown in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxSignature(pub [u8; 64]);

impl TxSignature {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl From<Ed25519Signature> for TxSignature {
    fn from(sig: Ed25519Signature) -> Self {
        Self(*sig.as_bytes())
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxSignature({self})")
    }
}

impl FromStr for TxSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec().map_err(|e| e.to_string())?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("signature must be 64 bytes, got {}", v.len()))?;
        Ok(Self(arr))
    }
}

/// Execution failure attached to a signature status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFailure {
    /// Custom program error code, when the failure carries one.
    pub code: Option<u32>,
    /// Raw failure description.
    pub message: String,
}

/// Status of a submitted signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    /// Slot the transaction landed in.
    pub slot: u64,
    /// Depth reached so far; `None` when the node reports no level.
    pub confirmation: Option<Commitment>,
    /// Execution failure, if the transaction failed.
    pub error: Option<ProgramFailure>,
}

impl TxStatus {
    /// Whether the status is at least `target` deep.
    pub fn reached(&self, target: Commitment) -> bool {
        self.confirmation.is_some_and(|c| c >= target)
    }
}

/// An account as fetched from the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    /// Native balance.
    pub lamports: Lamports,
    /// Raw account data.
    pub data: Vec<u8>,
    /// Owning program.
    pub owner: Pubkey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
        assert_eq!(Commitment::default(), Commitment::Confirmed);
        assert_eq!("Finalized".parse::<Commitment>().unwrap(), Commitment::Finalized);
    }

    #[test]
    fn test_processed_status_never_reaches_confirmed() {
        let status = TxStatus {
            slot: 1,
            confirmation: Some(Commitment::Processed),
            error: None,
        };
        assert!(!status.reached(Commitment::Confirmed));
        assert!(status.reached(Commitment::Processed));
    }

    #[test]
    fn test_signature_base58() {
        let sig = TxSignature([7u8; 64]);
        let parsed: TxSignature = sig.to_string().parse().unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn test_anchor_expiry_is_strict() {
        let anchor = LivenessAnchor {
            blockhash: [1u8; 32],
            last_valid_block_height: 100,
        };
        assert!(!anchor.is_expired_at(100));
        assert!(anchor.is_expired_at(101));
    }
}
