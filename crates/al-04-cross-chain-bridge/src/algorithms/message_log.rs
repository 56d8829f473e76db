//! # MessageSent Log
//!
//! The burn emits `MessageSent(bytes message)` from the message transmitter.
//! The log data is the ABI encoding of one dynamic `bytes` value:
//!
//! ```text
//! word 0: offset (0x20)
//! word 1: length
//! word 2..: message, zero-padded to a word boundary
//! ```
//!
//! The burn identifier is `keccak256(message)`.

use crate::ports::outbound::{EvmLog, EvmReceipt};
use al_02_settlement::CctpMessage;
use shared_crypto::keccak256;
use shared_types::Hash;

/// `keccak256("MessageSent(bytes)")`.
pub fn message_sent_topic() -> Hash {
    keccak256(b"MessageSent(bytes)")
}

/// Identifier the attestation service indexes a burn by.
pub fn burn_id(message: &[u8]) -> Hash {
    CctpMessage::hash_of(message)
}

/// Decode the `bytes` argument of a `MessageSent` log.
pub fn decode_message_sent(log: &EvmLog) -> Option<Vec<u8>> {
    if log.topics.first() != Some(&message_sent_topic()) {
        return None;
    }
    let data = &log.data;
    let offset = word_as_usize(data.get(0..32)?)?;
    let len_end = offset.checked_add(32)?;
    let len = word_as_usize(data.get(offset..len_end)?)?;
    let end = len_end.checked_add(len)?;
    Some(data.get(len_end..end)?.to_vec())
}

/// First `MessageSent` message in a receipt.
pub fn extract_message(receipt: &EvmReceipt) -> Option<Vec<u8>> {
    receipt.logs.iter().find_map(decode_message_sent)
}

/// ABI-encode a message as `MessageSent` log data.
pub fn encode_message_sent(message: &[u8]) -> Vec<u8> {
    let padded = message.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(64 + padded);
    out.extend_from_slice(&word(32));
    out.extend_from_slice(&word(message.len() as u64));
    out.extend_from_slice(message);
    out.resize(64 + padded, 0);
    out
}

fn word(value: u64) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[24..].copy_from_slice(&value.to_be_bytes());
    w
}

fn word_as_usize(word: &[u8]) -> Option<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..32]);
    usize::try_from(u64::from_be_bytes(tail)).ok()
}
