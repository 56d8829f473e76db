//! In-memory ledger store.

use crate::domain::{GlobalConfig, NgoRecord, Pool, SettlementError};
use crate::ports::outbound::{LedgerStore, RecordKey, WriteBatch};
use shared_types::{Hash, Lamports, PoolId, Pubkey};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Ledger store backed by plain maps.
///
/// `commit` cannot fail part-way, so every batch is applied whole.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    config: Option<GlobalConfig>,
    pools: BTreeMap<PoolId, Pool>,
    ngos: HashMap<Pubkey, NgoRecord>,
    balances: HashMap<Pubkey, Lamports>,
    consumed: HashSet<Hash>,
    index: HashMap<Pubkey, RecordKey>,
}

impl InMemoryLedgerStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consumed burn messages.
    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get_config(&self) -> Result<Option<GlobalConfig>, SettlementError> {
        Ok(self.config.clone())
    }

    fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, SettlementError> {
        Ok(self.pools.get(&id).cloned())
    }

    fn get_ngo(&self, wallet: &Pubkey) -> Result<Option<NgoRecord>, SettlementError> {
        Ok(self.ngos.get(wallet).cloned())
    }

    fn pool_ids(&self) -> Result<Vec<PoolId>, SettlementError> {
        Ok(self.pools.keys().copied().collect())
    }

    fn balance(&self, address: &Pubkey) -> Result<Lamports, SettlementError> {
        Ok(self.balances.get(address).copied().unwrap_or(0))
    }

    fn is_consumed(&self, message_hash: &Hash) -> Result<bool, SettlementError> {
        Ok(self.consumed.contains(message_hash))
    }

    fn resolve(&self, address: &Pubkey) -> Result<Option<RecordKey>, SettlementError> {
        Ok(self.index.get(address).cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), SettlementError> {
        if let Some((address, config)) = batch.config {
            self.index.insert(address, RecordKey::Config);
            self.config = Some(config);
        }
        for (address, pool) in batch.pools {
            self.index.insert(address, RecordKey::Pool(pool.id));
            self.pools.insert(pool.id, pool);
        }
        for (address, ngo) in batch.ngos {
            self.index.insert(address, RecordKey::Ngo(ngo.wallet));
            self.ngos.insert(ngo.wallet, ngo);
        }
        for (address, lamports) in batch.balances {
            self.balances.insert(address, lamports);
        }
        self.consumed.extend(batch.consumed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_indexes_addresses() {
        let mut store = InMemoryLedgerStore::new();
        let address = Pubkey::new([7u8; 32]);
        store
            .commit(
                WriteBatch::new()
                    .put_pool(address, Pool::new(3, "Sudan", 250))
                    .set_balance(address, 40),
            )
            .unwrap();

        assert_eq!(store.resolve(&address).unwrap(), Some(RecordKey::Pool(3)));
        assert_eq!(store.balance(&address).unwrap(), 40);
        assert_eq!(store.pool_ids().unwrap(), vec![3]);
        assert_eq!(store.balance(&Pubkey::new([8u8; 32])).unwrap(), 0);
    }

    #[test]
    fn test_consumed_set() {
        let mut store = InMemoryLedgerStore::new();
        assert!(!store.is_consumed(&[1u8; 32]).unwrap());
        store.commit(WriteBatch::new().consume([1u8; 32])).unwrap();
        assert!(store.is_consumed(&[1u8; 32]).unwrap());
        assert_eq!(store.consumed_count(), 1);
    }
}
