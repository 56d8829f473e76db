//! # Program Address Derivation
//!
//! `address = sha256(seed_0 || ... || seed_n || program_id || PDA_MARKER)`,
//! accepted only when the digest does not decompress to an Ed25519 point.

use crate::domain::{DerivationError, DerivedAddress, MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
use curve25519_dalek::edwards::CompressedEdwardsY;
use shared_crypto::sha256v;
use shared_types::Pubkey;
use tracing::trace;

/// Whether 32 bytes decode as a point on the Ed25519 curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Hash seeds into a program address, rejecting on-curve results.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    if seeds.len() > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds {
            count: seeds.len(),
            max: MAX_SEEDS,
        });
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(DerivationError::SeedTooLong {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.extend_from_slice(seeds);
    parts.push(program_id.as_ref());
    parts.push(PDA_MARKER);

    let digest = sha256v(&parts);
    if is_on_curve(&digest) {
        return Err(DerivationError::OnCurve);
    }
    Ok(Pubkey::new(digest))
}

/// Find the first off-curve address, walking the bump from 255 down to 0.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<DerivedAddress, DerivationError> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);
        let attempt = create_program_address(&with_bump, program_id);

        match attempt {
            Ok(address) => return Ok(DerivedAddress { address, bump }),
            Err(DerivationError::OnCurve) => {
                trace!(bump, "Bump produced on-curve address, retrying");
            }
            Err(e) => return Err(e),
        }
    }
    Err(DerivationError::NoViableBump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_PROGRAM_ID;

    #[test]
    fn test_found_address_is_off_curve() {
        let found = find_program_address(&[b"pool", &7u64.to_le_bytes()], &DEFAULT_PROGRAM_ID)
            .unwrap();
        assert!(!is_on_curve(&found.address.0));
    }

    #[test]
    fn test_create_with_found_bump_matches() {
        let id = 3u64.to_le_bytes();
        let found = find_program_address(&[b"pool", &id], &DEFAULT_PROGRAM_ID).unwrap();
        let recreated =
            create_program_address(&[b"pool", &id, &[found.bump]], &DEFAULT_PROGRAM_ID).unwrap();
        assert_eq!(recreated, found.address);
    }

    #[test]
    fn test_program_id_changes_address() {
        let other = Pubkey::new([1u8; 32]);
        let a = find_program_address(&[b"config"], &DEFAULT_PROGRAM_ID).unwrap();
        let b = find_program_address(&[b"config"], &other).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_seed_limits() {
        let long = [0u8; 33];
        assert_eq!(
            create_program_address(&[&long], &DEFAULT_PROGRAM_ID),
            Err(DerivationError::SeedTooLong { len: 33, max: 32 })
        );

        let seed: &[u8] = b"x";
        let seeds = vec![seed; 17];
        assert_eq!(
            create_program_address(&seeds, &DEFAULT_PROGRAM_ID),
            Err(DerivationError::TooManySeeds { count: 17, max: 16 })
        );
    }

    #[test]
    fn test_wallet_keys_are_on_curve() {
        // Basepoint compressed encoding.
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }
}
