//! # Domain Errors

use thiserror::Error;

/// Address derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// A seed exceeds the per-seed limit.
    #[error("Seed too long: {len} bytes (max {max})")]
    SeedTooLong {
        /// Offending seed length
        len: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Too many seeds supplied.
    #[error("Too many seeds: {count} (max {max})")]
    TooManySeeds {
        /// Seeds supplied (including the bump)
        count: usize,
        /// Allowed maximum
        max: usize,
    },

    /// The digest landed on the curve, so it cannot be a program address.
    #[error("Derived address is on the Ed25519 curve")]
    OnCurve,

    /// Every bump from 255 down to 0 produced an on-curve digest.
    #[error("No viable bump seed found")]
    NoViableBump,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_too_long_message() {
        let err = DerivationError::SeedTooLong { len: 40, max: 32 };
        assert!(err.to_string().contains("40 bytes"));
    }
}
