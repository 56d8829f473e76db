//! Errors from hashing, signing and signer recovery.

use thiserror::Error;

/// Key, signature and recovery failures.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Byte string of the wrong size for the key or signature type.
    #[error("Expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Well-formed signature that does not match the message and signer.
    #[error("Signature does not verify")]
    SignatureVerificationFailed,

    /// Signature bytes that cannot be parsed (bad length or recovery id).
    #[error("Malformed signature")]
    InvalidSignatureFormat,

    /// Ed25519 public key not on the curve.
    #[error("Public key is not a valid curve point")]
    InvalidPublicKey,

    /// secp256k1 scalar of zero or above the group order.
    #[error("Secret key out of range")]
    InvalidPrivateKey,

    /// ECDSA `r` or `s` outside the scalar range.
    #[error("Signature scalars out of range")]
    InvalidSignature,

    /// Signing backend refused the input.
    #[error("Signing failed: {0}")]
    InvalidInput(String),
}
