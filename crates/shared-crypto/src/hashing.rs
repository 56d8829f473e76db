//! # Hashing
//!
//! SHA-256 for primary-chain derivations (addresses, discriminators) and
//! Keccak-256 for secondary-chain material (selectors, message hashes).

use sha2::{Digest, Sha256};
use sha3::Keccak256;
use shared_types::Hash;

/// SHA-256 of a single buffer.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 over several buffers concatenated.
pub fn sha256v(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Keccak-256 (pre-standard SHA-3 padding, as used by Ethereum).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// First four bytes of the Keccak-256 of a Solidity signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}
