//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures as produced by cross-chain attesters.
//!
//! ## Format
//!
//! A signature is 65 bytes, `r || s || v`, with `v ∈ {27, 28}` (raw
//! recovery ids `0`/`1` are accepted as well). Signers are identified by the
//! Ethereum address recovered from the signature, never by a public key
//! shipped alongside it.

use crate::hashing::keccak256;
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{EthAddress, Hash};
use zeroize::Zeroize;

/// Width of a recoverable signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Ethereum address of a secp256k1 public key.
pub fn eth_address(key: &VerifyingKey) -> EthAddress {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    EthAddress(out)
}

/// Recover the signer address of a 65-byte signature over a 32-byte digest.
pub fn recover_eth_address(prehash: &Hash, signature: &[u8]) -> Result<EthAddress, CryptoError> {
    if signature.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: RECOVERABLE_SIGNATURE_LEN,
            actual: signature.len(),
        });
    }

    let v = signature[64];
    let recid_byte = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        _ => return Err(CryptoError::InvalidSignatureFormat),
    };
    let recid = RecoveryId::from_byte(recid_byte).ok_or(CryptoError::InvalidSignatureFormat)?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| CryptoError::InvalidSignature)?;

    let key = VerifyingKey::recover_from_prehash(prehash, &sig, recid)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;
    Ok(eth_address(&key))
}

/// secp256k1 attester keypair.
pub struct AttesterKey {
    signing_key: SigningKey,
}

impl AttesterKey {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Address this key signs as.
    pub fn address(&self) -> EthAddress {
        eth_address(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, returning `r || s || v` with `v = 27 + recid`.
    pub fn sign_prehash(&self, prehash: &Hash) -> Result<[u8; 65], CryptoError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = 27 + recid.to_byte();
        Ok(out)
    }
}

impl Drop for AttesterKey {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> AttesterKey {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        AttesterKey::from_bytes(secret).unwrap()
    }

    #[test]
    fn test_known_address_for_secret_one() {
        assert_eq!(
            key_one().address().to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_sign_recover_roundtrip() {
        let key = AttesterKey::generate();
        let digest = keccak256(b"burn message");
        let sig = key.sign_prehash(&digest).unwrap();
        assert!(sig[64] == 27 || sig[64] == 28);
        assert_eq!(recover_eth_address(&digest, &sig).unwrap(), key.address());
    }

    #[test]
    fn test_recover_other_digest_gives_other_address() {
        let key = key_one();
        let sig = key.sign_prehash(&keccak256(b"a")).unwrap();
        let recovered = recover_eth_address(&keccak256(b"b"), &sig);
        assert!(recovered.map(|a| a != key.address()).unwrap_or(true));
    }

    #[test]
    fn test_rejects_bad_length_and_v() {
        let digest = keccak256(b"x");
        assert!(recover_eth_address(&digest, &[0u8; 64]).is_err());

        let mut sig = key_one().sign_prehash(&digest).unwrap();
        sig[64] = 35;
        assert!(matches!(
            recover_eth_address(&digest, &sig),
            Err(CryptoError::InvalidSignatureFormat)
        ));
    }
}
