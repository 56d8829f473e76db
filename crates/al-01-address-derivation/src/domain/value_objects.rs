//! # Domain Value Objects

use shared_types::Pubkey;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Marker appended to every program-address preimage.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Program owning every ledger account
/// (`BCm48SATqUi4zUCgYav4KGgnpDqg1tnsLfw7i4HwGE3J`).
pub const DEFAULT_PROGRAM_ID: Pubkey = Pubkey::new([
    151, 152, 17, 242, 107, 121, 39, 63, 47, 138, 212, 244, 168, 188, 98, 120, 232, 90, 117, 208,
    240, 83, 119, 178, 119, 187, 84, 63, 90, 90, 194, 81,
]);

/// Record kinds that live at derived addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Relief pool, keyed by numeric id.
    Pool,
    /// NGO authorization record, keyed by wallet.
    Ngo,
    /// Global configuration singleton.
    Config,
}

impl Namespace {
    /// Fixed tag seed for this namespace.
    pub fn tag(&self) -> &'static [u8] {
        match self {
            Namespace::Pool => b"pool",
            Namespace::Ngo => b"ngo",
            Namespace::Config => b"config",
        }
    }
}

/// An address found by bump search, with the bump that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    /// The derived account address.
    pub address: Pubkey,
    /// Bump seed; stored in the account so later checks skip the search.
    pub bump: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_tags_are_distinct() {
        assert_ne!(Namespace::Pool.tag(), Namespace::Ngo.tag());
        assert_ne!(Namespace::Ngo.tag(), Namespace::Config.tag());
    }

    #[test]
    fn test_default_program_id_text() {
        assert_eq!(
            DEFAULT_PROGRAM_ID.to_string(),
            "BCm48SATqUi4zUCgYav4KGgnpDqg1tnsLfw7i4HwGE3J"
        );
    }
}
