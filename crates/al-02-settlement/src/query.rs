//! # Read-Model Queries
//!
//! Pool enumeration is driven by an externally known id list; the ledger
//! keeps no directory of its own.

use crate::domain::{NgoRecord, Pool, SettlementError};
use crate::engine::SettlementEngine;
use crate::ports::outbound::{ClockSource, LedgerStore};
use serde::{Deserialize, Serialize};
use shared_types::{Lamports, PoolId, Pubkey};

/// A pool with its account address and live balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    /// Pool record.
    pub pool: Pool,
    /// Derived account address.
    pub address: Pubkey,
    /// Native balance of the pool account.
    pub balance: Lamports,
}

/// Totals across a set of pools.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Pools counted.
    pub pools: usize,
    /// Of which active.
    pub active_pools: usize,
    /// Sum of lifetime credits.
    pub total_donated: u128,
    /// Sum of lifetime withdrawals.
    pub total_withdrawn: u128,
}

impl LedgerTotals {
    /// Credited but not yet withdrawn.
    pub fn outstanding(&self) -> u128 {
        self.total_donated.saturating_sub(self.total_withdrawn)
    }
}

impl<S: LedgerStore, C: ClockSource> SettlementEngine<S, C> {
    /// Pool record plus address and balance.
    pub fn pool_summary(&self, id: PoolId) -> Result<Option<PoolSummary>, SettlementError> {
        let Some(pool) = self.store.get_pool(id)? else {
            return Ok(None);
        };
        let address = self.deriver.pool(id)?.address;
        let balance = self.store.balance(&address)?;
        Ok(Some(PoolSummary {
            pool,
            address,
            balance,
        }))
    }

    /// Summaries for `ids`, in order, skipping ids with no pool.
    pub fn get_pools(&self, ids: &[PoolId]) -> Result<Vec<PoolSummary>, SettlementError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(summary) = self.pool_summary(*id)? {
                out.push(summary);
            }
        }
        Ok(out)
    }

    /// Existing pools an NGO may withdraw from, with its record.
    pub fn pools_for_ngo(
        &self,
        wallet: &Pubkey,
    ) -> Result<Option<(NgoRecord, Vec<PoolSummary>)>, SettlementError> {
        let Some(ngo) = self.store.get_ngo(wallet)? else {
            return Ok(None);
        };
        let pools = self.get_pools(&ngo.allowed_pools)?;
        Ok(Some((ngo, pools)))
    }

    /// Totals over `ids`.
    pub fn totals(&self, ids: &[PoolId]) -> Result<LedgerTotals, SettlementError> {
        let mut totals = LedgerTotals::default();
        for summary in self.get_pools(ids)? {
            totals.pools += 1;
            if summary.pool.is_active {
                totals.active_pools += 1;
            }
            totals.total_donated += u128::from(summary.pool.total_donated);
            totals.total_withdrawn += u128::from(summary.pool.total_withdrawn);
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::{InMemoryLedgerStore, ManualClock};
    use crate::engine::SettlementEngine;
    use shared_types::{EthAddress, Pubkey};
    use std::sync::Arc;

    #[test]
    fn test_get_pools_skips_missing_and_keeps_order() {
        let mut engine = SettlementEngine::new(
            InMemoryLedgerStore::new(),
            Arc::new(ManualClock::at(1_700_000_000)),
        );
        let admin = Pubkey::new([1u8; 32]);
        let config = engine
            .initialize(&admin, &[EthAddress([1u8; 20])], 1, 5)
            .unwrap();
        engine.create_pool(&config, &admin, 2, "Gaza").unwrap();
        engine.create_pool(&config, &admin, 0, "Ukraine").unwrap();
        let donor = Pubkey::new([9u8; 32]);
        engine.deposit_native(&donor, 300).unwrap();
        engine.donate_to_pool(&donor, 2, 300).unwrap();

        let pools = engine.get_pools(&[2, 1, 0]).unwrap();
        let ids: Vec<_> = pools.iter().map(|p| p.pool.id).collect();
        assert_eq!(ids, vec![2, 0]);
        assert_eq!(pools[0].balance, 300);

        let totals = engine.totals(&[0, 1, 2]).unwrap();
        assert_eq!(totals.pools, 2);
        assert_eq!(totals.total_donated, 300);
        assert_eq!(totals.outstanding(), 300);
    }

    #[test]
    fn test_pools_for_ngo() {
        let mut engine = SettlementEngine::new(
            InMemoryLedgerStore::new(),
            Arc::new(ManualClock::at(1_700_000_000)),
        );
        let admin = Pubkey::new([1u8; 32]);
        let config = engine
            .initialize(&admin, &[EthAddress([1u8; 20])], 1, 5)
            .unwrap();
        engine.create_pool(&config, &admin, 0, "Ukraine").unwrap();
        let wallet = Pubkey::new([5u8; 32]);
        engine
            .register_ngo(&config, &admin, &wallet, &[0, 7], 100)
            .unwrap();

        let (ngo, pools) = engine.pools_for_ngo(&wallet).unwrap().unwrap();
        assert_eq!(ngo.allowed_pools, vec![0, 7]);
        assert_eq!(pools.len(), 1);
        assert!(engine.pools_for_ngo(&admin).unwrap().is_none());
    }
}
