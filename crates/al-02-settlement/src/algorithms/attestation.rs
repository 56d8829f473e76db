//! Attestation quorum.
//!
//! An attestation is a concatenation of 65-byte recoverable signatures over
//! `keccak256(message)`. Each signature counts once toward the threshold if
//! it recovers to a configured attester not already counted. Signatures that
//! fail to recover, or recover to an unknown address, are ignored.

use crate::codec::split_attestation;
use crate::domain::{GlobalConfig, SettlementError};
use shared_crypto::recover_eth_address;
use shared_types::{EthAddress, Hash};

/// Number of distinct configured attesters that signed `message_hash`.
pub fn count_valid_attesters(
    attesters: &[EthAddress],
    message_hash: &Hash,
    attestation: &[u8],
) -> usize {
    let Some(signatures) = split_attestation(attestation) else {
        return 0;
    };

    let mut seen: Vec<EthAddress> = Vec::with_capacity(signatures.len());
    for signature in &signatures {
        if let Ok(signer) = recover_eth_address(message_hash, signature) {
            if attesters.contains(&signer) && !seen.contains(&signer) {
                seen.push(signer);
            }
        }
    }
    seen.len()
}

/// Fail unless the configured threshold of attesters signed `message_hash`.
pub fn verify_attestation(
    config: &GlobalConfig,
    message_hash: &Hash,
    attestation: &[u8],
) -> Result<(), SettlementError> {
    let valid = count_valid_attesters(&config.attesters, message_hash, attestation);
    let required = usize::from(config.attestation_threshold);
    if valid < required {
        return Err(SettlementError::InvalidAttestation { valid, required });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::AttesterKey;
    use shared_types::Pubkey;

    fn config(attesters: Vec<EthAddress>, threshold: u8) -> GlobalConfig {
        GlobalConfig {
            admin: Pubkey::new([1u8; 32]),
            attesters,
            attestation_threshold: threshold,
            local_domain: 5,
            bump: 255,
        }
    }

    #[test]
    fn test_single_attester_meets_threshold() {
        let key = AttesterKey::from_bytes([11u8; 32]).unwrap();
        let hash = [42u8; 32];
        let sig = key.sign_prehash(&hash).unwrap();

        let cfg = config(vec![key.address()], 1);
        assert!(verify_attestation(&cfg, &hash, &sig).is_ok());
    }

    #[test]
    fn test_duplicate_signature_counts_once() {
        let a = AttesterKey::from_bytes([11u8; 32]).unwrap();
        let b = AttesterKey::from_bytes([12u8; 32]).unwrap();
        let hash = [42u8; 32];
        let sig = a.sign_prehash(&hash).unwrap();

        let mut twice = sig.to_vec();
        twice.extend_from_slice(&sig);

        let cfg = config(vec![a.address(), b.address()], 2);
        assert_eq!(count_valid_attesters(&cfg.attesters, &hash, &twice), 1);
        assert_eq!(
            verify_attestation(&cfg, &hash, &twice),
            Err(SettlementError::InvalidAttestation {
                valid: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_unknown_signer_ignored() {
        let outsider = AttesterKey::from_bytes([13u8; 32]).unwrap();
        let member = AttesterKey::from_bytes([14u8; 32]).unwrap();
        let hash = [1u8; 32];
        let sig = outsider.sign_prehash(&hash).unwrap();
        assert_eq!(count_valid_attesters(&[member.address()], &hash, &sig), 0);
    }

    #[test]
    fn test_signature_over_other_message_rejected() {
        let key = AttesterKey::from_bytes([15u8; 32]).unwrap();
        let sig = key.sign_prehash(&[2u8; 32]).unwrap();
        assert_eq!(count_valid_attesters(&[key.address()], &[3u8; 32], &sig), 0);
    }

    #[test]
    fn test_malformed_attestation_counts_zero() {
        assert_eq!(count_valid_attesters(&[], &[0u8; 32], &[0u8; 64]), 0);
        assert_eq!(count_valid_attesters(&[], &[0u8; 32], &[0u8; 65]), 0);
    }
}
