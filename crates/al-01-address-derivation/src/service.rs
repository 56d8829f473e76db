//! # Address Deriver
//!
//! Typed derivations for each ledger record, bound to one program id.

use crate::algorithms::find_program_address;
use crate::domain::{DerivationError, DerivedAddress, Namespace, DEFAULT_PROGRAM_ID};
use shared_types::{PoolId, Pubkey};

/// Derives ledger record addresses for a fixed program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDeriver {
    program_id: Pubkey,
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM_ID)
    }
}

impl AddressDeriver {
    /// Bind to a program id.
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Program the addresses belong to.
    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Address of pool `id`.
    pub fn pool(&self, id: PoolId) -> Result<DerivedAddress, DerivationError> {
        derive_pool_address(id, &self.program_id)
    }

    /// Address of the NGO record for `wallet`.
    pub fn ngo(&self, wallet: &Pubkey) -> Result<DerivedAddress, DerivationError> {
        derive_ngo_address(wallet, &self.program_id)
    }

    /// Address of the global configuration.
    pub fn config(&self) -> Result<DerivedAddress, DerivationError> {
        derive_config_address(&self.program_id)
    }
}

/// `[b"pool", id (u64 LE)]`
pub fn derive_pool_address(
    id: PoolId,
    program_id: &Pubkey,
) -> Result<DerivedAddress, DerivationError> {
    let id_bytes = id.to_le_bytes();
    find_program_address(&[Namespace::Pool.tag(), &id_bytes], program_id)
}

/// `[b"ngo", wallet]`
pub fn derive_ngo_address(
    wallet: &Pubkey,
    program_id: &Pubkey,
) -> Result<DerivedAddress, DerivationError> {
    find_program_address(&[Namespace::Ngo.tag(), wallet.as_ref()], program_id)
}

/// `[b"config"]`
pub fn derive_config_address(program_id: &Pubkey) -> Result<DerivedAddress, DerivationError> {
    find_program_address(&[Namespace::Config.tag()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pool_derivation_is_deterministic() {
        let deriver = AddressDeriver::default();
        assert_eq!(deriver.pool(7).unwrap(), deriver.pool(7).unwrap());
    }

    #[test]
    fn test_pool_derivation_is_injective() {
        let deriver = AddressDeriver::default();
        assert_ne!(deriver.pool(7).unwrap().address, deriver.pool(8).unwrap().address);

        let addresses: HashSet<_> = (0..64u64)
            .map(|id| deriver.pool(id).unwrap().address)
            .collect();
        assert_eq!(addresses.len(), 64);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let deriver = AddressDeriver::default();
        // An NGO wallet whose bytes spell the pool seed must not alias the pool.
        let mut wallet = [0u8; 32];
        wallet[..8].copy_from_slice(&7u64.to_le_bytes());
        let ngo = deriver.ngo(&Pubkey::new(wallet)).unwrap();
        assert_ne!(ngo.address, deriver.pool(7).unwrap().address);
        assert_ne!(deriver.config().unwrap().address, deriver.pool(0).unwrap().address);
    }

    #[test]
    fn test_distinct_wallets_distinct_ngo_addresses() {
        let deriver = AddressDeriver::default();
        let a = deriver.ngo(&Pubkey::new([1u8; 32])).unwrap();
        let b = deriver.ngo(&Pubkey::new([2u8; 32])).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_free_function_matches_deriver() {
        let deriver = AddressDeriver::default();
        assert_eq!(
            derive_pool_address(1, &DEFAULT_PROGRAM_ID).unwrap(),
            deriver.pool(1).unwrap()
        );
        assert_eq!(deriver.program_id(), DEFAULT_PROGRAM_ID);
    }
}
