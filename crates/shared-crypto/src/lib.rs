//! # Shared Crypto
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, Keccak-256 | Address derivation, selectors, message ids |
//! | `signatures` | Ed25519 | Primary-chain wallets and transaction signing |
//! | `ecdsa` | secp256k1 (recoverable) | Cross-chain attestation signatures |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use ecdsa::{eth_address, recover_eth_address, AttesterKey, RECOVERABLE_SIGNATURE_LEN};
pub use errors::CryptoError;
pub use hashing::{keccak256, selector, sha256, sha256v};
pub use signatures::{verify_ed25519, Ed25519Signature, WalletKeypair};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
