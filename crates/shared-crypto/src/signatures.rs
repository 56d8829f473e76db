//! # Ed25519 Signatures
//!
//! Wallet keys for the primary chain. A wallet's address is its Ed25519
//! public key, so verification works directly on a `Pubkey`.
//!
//! ## Security Properties
//!
//! - No RNG dependency when signing (deterministic nonce from message)
//! - Secret seed is zeroized when the keypair is dropped

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::Pubkey;
use zeroize::Zeroize;

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Build from a slice, checking the width.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        Ok(Self(arr))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Verify `signature` over `message` against a wallet address.
pub fn verify_ed25519(
    signer: &Pubkey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(&signer.0).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Ed25519 wallet keypair.
pub struct WalletKeypair {
    signing_key: SigningKey,
}

impl WalletKeypair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// The wallet address.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl Drop for WalletKeypair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for WalletKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKeypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let wallet = WalletKeypair::generate();
        let signature = wallet.sign(b"donate");
        assert!(verify_ed25519(&wallet.pubkey(), b"donate", &signature).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let wallet = WalletKeypair::generate();
        let signature = wallet.sign(b"message1");
        assert!(verify_ed25519(&wallet.pubkey(), b"message2", &signature).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let a = WalletKeypair::from_seed([1u8; 32]);
        let b = WalletKeypair::from_seed([2u8; 32]);
        let signature = a.sign(b"test");
        assert!(matches!(
            verify_ed25519(&b.pubkey(), b"test", &signature),
            Err(CryptoError::SignatureVerificationFailed)
        ));
    }

    #[test]
    fn test_seeded_keys_are_stable() {
        let a = WalletKeypair::from_seed([0xAB; 32]);
        let b = WalletKeypair::from_seed([0xAB; 32]);
        assert_eq!(a.pubkey(), b.pubkey());
        assert_eq!(a.sign(b"x"), b.sign(b"x"));
    }

    #[test]
    fn test_signature_slice_width() {
        assert!(Ed25519Signature::try_from_slice(&[0u8; 63]).is_err());
        assert!(Ed25519Signature::try_from_slice(&[0u8; 64]).is_ok());
    }
}
