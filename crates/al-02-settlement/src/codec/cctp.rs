//! # Cross-Chain Burn Message
//!
//! CCTP v1 message as emitted by the source chain's `MessageSent(bytes)`
//! event. All integers are big-endian.
//!
//! ```text
//! header   version u32 | source u32 | destination u32 | nonce u64 |
//!          sender [32] | recipient [32] | destination_caller [32]
//! body     version u32 | burn_token [32] | mint_recipient [32] |
//!          amount uint256 | message_sender [32]
//! ```
//!
//! The burn identifier is `keccak256(message)`.

use super::CodecError;
use shared_crypto::{keccak256, RECOVERABLE_SIGNATURE_LEN};
use shared_types::{Hash, Lamports};

/// Header length in bytes.
pub const HEADER_LEN: usize = 116;

/// Burn body length in bytes.
pub const BURN_MESSAGE_LEN: usize = 132;

/// Only message and body version understood.
pub const MESSAGE_VERSION: u32 = 0;

/// Burn body carried by a CCTP message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnMessage {
    /// Body version.
    pub version: u32,
    /// Burned token on the source chain, left-padded.
    pub burn_token: [u8; 32],
    /// Destination account that receives the mint.
    pub mint_recipient: [u8; 32],
    /// Burned amount in token base units.
    pub amount: Lamports,
    /// Source-chain account that initiated the burn, left-padded.
    pub message_sender: [u8; 32],
}

/// A decoded CCTP v1 message with a burn body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CctpMessage {
    /// Message version.
    pub version: u32,
    /// Source domain.
    pub source_domain: u32,
    /// Destination domain.
    pub destination_domain: u32,
    /// Per-source-domain nonce.
    pub nonce: u64,
    /// Sending contract on the source chain.
    pub sender: [u8; 32],
    /// Receiving program on the destination chain.
    pub recipient: [u8; 32],
    /// Only caller allowed to relay, zero for anyone.
    pub destination_caller: [u8; 32],
    /// Burn details.
    pub body: BurnMessage,
}

impl CctpMessage {
    /// Parse raw message bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let needed = HEADER_LEN + BURN_MESSAGE_LEN;
        if bytes.len() < needed {
            return Err(CodecError::TooShort {
                needed,
                got: bytes.len(),
            });
        }

        let version = read_u32(bytes, 0);
        if version != MESSAGE_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let body = &bytes[HEADER_LEN..];
        let body_version = read_u32(body, 0);
        if body_version != MESSAGE_VERSION {
            return Err(CodecError::UnsupportedVersion(body_version));
        }

        let amount_word = read_32(body, 68);
        if amount_word[..24].iter().any(|b| *b != 0) {
            return Err(CodecError::AmountOverflow);
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&amount_word[24..]);

        Ok(Self {
            version,
            source_domain: read_u32(bytes, 4),
            destination_domain: read_u32(bytes, 8),
            nonce: u64::from_be_bytes(read_8(bytes, 12)),
            sender: read_32(bytes, 20),
            recipient: read_32(bytes, 52),
            destination_caller: read_32(bytes, 84),
            body: BurnMessage {
                version: body_version,
                burn_token: read_32(body, 4),
                mint_recipient: read_32(body, 36),
                amount: u64::from_be_bytes(low),
                message_sender: read_32(body, 100),
            },
        })
    }

    /// Serialize to raw message bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + BURN_MESSAGE_LEN);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.source_domain.to_be_bytes());
        out.extend_from_slice(&self.destination_domain.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.sender);
        out.extend_from_slice(&self.recipient);
        out.extend_from_slice(&self.destination_caller);

        out.extend_from_slice(&self.body.version.to_be_bytes());
        out.extend_from_slice(&self.body.burn_token);
        out.extend_from_slice(&self.body.mint_recipient);
        out.extend_from_slice(&[0u8; 24]);
        out.extend_from_slice(&self.body.amount.to_be_bytes());
        out.extend_from_slice(&self.body.message_sender);
        out
    }

    /// Burn identifier of raw message bytes.
    pub fn hash_of(bytes: &[u8]) -> Hash {
        keccak256(bytes)
    }
}

/// Split a concatenated attestation into 65-byte signatures.
pub fn split_attestation(attestation: &[u8]) -> Option<Vec<[u8; 65]>> {
    if attestation.is_empty() || attestation.len() % RECOVERABLE_SIGNATURE_LEN != 0 {
        return None;
    }
    let sigs = attestation
        .chunks_exact(RECOVERABLE_SIGNATURE_LEN)
        .map(|chunk| {
            let mut sig = [0u8; 65];
            sig.copy_from_slice(chunk);
            sig
        })
        .collect();
    Some(sigs)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_be_bytes(buf)
}

fn read_8(bytes: &[u8], at: usize) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    buf
}

fn read_32(bytes: &[u8], at: usize) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&bytes[at..at + 32]);
    buf
}
