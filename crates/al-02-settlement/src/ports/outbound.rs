//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the settlement engine requires from its host: durable
//! record storage and the canonical ledger clock.

use crate::domain::{GlobalConfig, NgoRecord, Pool, SettlementError};
use shared_types::{day_index, DayIndex, Hash, Lamports, PoolId, Pubkey, UnixTimestamp};

/// Canonical ledger clock.
///
/// The current day is always taken from here, never from the caller.
pub trait ClockSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> UnixTimestamp;

    /// Day index of the current timestamp.
    fn current_day(&self) -> DayIndex {
        day_index(self.unix_timestamp())
    }
}

/// Natural key an account address resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// The configuration singleton.
    Config,
    /// A pool by id.
    Pool(PoolId),
    /// An NGO record by wallet.
    Ngo(Pubkey),
}

/// A set of writes applied all together or not at all.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    /// Configuration singleton and its address.
    pub config: Option<(Pubkey, GlobalConfig)>,
    /// Pools to insert or overwrite, with their addresses.
    pub pools: Vec<(Pubkey, Pool)>,
    /// NGO records to insert or overwrite, with their addresses.
    pub ngos: Vec<(Pubkey, NgoRecord)>,
    /// Absolute native balances to set.
    pub balances: Vec<(Pubkey, Lamports)>,
    /// Burn message hashes to mark consumed.
    pub consumed: Vec<Hash>,
}

impl WriteBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the configuration.
    pub fn put_config(mut self, address: Pubkey, config: GlobalConfig) -> Self {
        self.config = Some((address, config));
        self
    }

    /// Write a pool.
    pub fn put_pool(mut self, address: Pubkey, pool: Pool) -> Self {
        self.pools.push((address, pool));
        self
    }

    /// Write an NGO record.
    pub fn put_ngo(mut self, address: Pubkey, ngo: NgoRecord) -> Self {
        self.ngos.push((address, ngo));
        self
    }

    /// Set a native balance.
    pub fn set_balance(mut self, address: Pubkey, lamports: Lamports) -> Self {
        self.balances.push((address, lamports));
        self
    }

    /// Mark a burn message consumed.
    pub fn consume(mut self, message_hash: Hash) -> Self {
        self.consumed.push(message_hash);
        self
    }

    /// Whether the batch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.config.is_none()
            && self.pools.is_empty()
            && self.ngos.is_empty()
            && self.balances.is_empty()
            && self.consumed.is_empty()
    }
}

/// Record storage keyed by natural key, plus an address index.
///
/// Production: the chain's account store.
/// Testing: `InMemoryLedgerStore` (adapters/memory.rs).
pub trait LedgerStore: Send + Sync {
    /// The configuration singleton, if initialized.
    fn get_config(&self) -> Result<Option<GlobalConfig>, SettlementError>;

    /// A pool by id.
    fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, SettlementError>;

    /// An NGO record by wallet.
    fn get_ngo(&self, wallet: &Pubkey) -> Result<Option<NgoRecord>, SettlementError>;

    /// Ids of every stored pool, ascending.
    fn pool_ids(&self) -> Result<Vec<PoolId>, SettlementError>;

    /// Native balance of an address; zero if never funded.
    fn balance(&self, address: &Pubkey) -> Result<Lamports, SettlementError>;

    /// Whether a burn message was already credited.
    fn is_consumed(&self, message_hash: &Hash) -> Result<bool, SettlementError>;

    /// Natural key stored at an account address.
    fn resolve(&self, address: &Pubkey) -> Result<Option<RecordKey>, SettlementError>;

    /// Apply a batch atomically.
    ///
    /// Either every write in the batch is applied, or none are.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), SettlementError>;
}
