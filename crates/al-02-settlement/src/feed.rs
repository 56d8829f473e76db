//! # Transaction Feed
//!
//! Bounded, newest-first list of recent ledger activity, built from bus
//! events. Rejections and bridge progress are not part of the feed.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_bus::LedgerEvent;
use shared_types::{Lamports, PoolId, Pubkey, UnixTimestamp};
use std::collections::VecDeque;

/// Default number of entries kept.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Kind of feed entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Direct donation.
    Donation,
    /// Cross-chain donation.
    BridgedDonation,
    /// NGO withdrawal.
    Withdrawal,
}

/// One line of the feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Entry kind.
    pub kind: FeedKind,
    /// Pool concerned.
    pub pool_id: PoolId,
    /// Amount moved.
    pub amount: Lamports,
    /// Donor or NGO wallet; `None` for bridged credits.
    pub actor: Option<Pubkey>,
    /// Ledger clock at execution.
    pub timestamp: UnixTimestamp,
}

impl FeedEntry {
    /// Feed entry for an event, if the event moves funds.
    pub fn from_event(event: &LedgerEvent) -> Option<Self> {
        match event {
            LedgerEvent::DonationReceived {
                pool_id,
                donor,
                amount,
                timestamp,
            } => Some(Self {
                kind: FeedKind::Donation,
                pool_id: *pool_id,
                amount: *amount,
                actor: Some(*donor),
                timestamp: *timestamp,
            }),
            LedgerEvent::BridgedDonationCredited {
                pool_id,
                amount,
                timestamp,
                ..
            } => Some(Self {
                kind: FeedKind::BridgedDonation,
                pool_id: *pool_id,
                amount: *amount,
                actor: None,
                timestamp: *timestamp,
            }),
            LedgerEvent::WithdrawalExecuted {
                pool_id,
                ngo_wallet,
                amount,
                timestamp,
                ..
            } => Some(Self {
                kind: FeedKind::Withdrawal,
                pool_id: *pool_id,
                amount: *amount,
                actor: Some(*ngo_wallet),
                timestamp: *timestamp,
            }),
            _ => None,
        }
    }
}

/// Shared, bounded activity feed.
#[derive(Debug)]
pub struct TransactionFeed {
    entries: RwLock<VecDeque<FeedEntry>>,
    capacity: usize,
}

impl Default for TransactionFeed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }
}

impl TransactionFeed {
    /// Feed keeping at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Record an event. Returns whether it produced an entry.
    pub fn apply(&self, event: &LedgerEvent) -> bool {
        let Some(entry) = FeedEntry::from_event(event) else {
            return false;
        };
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_back();
        }
        entries.push_front(entry);
        true
    }

    /// Up to `limit` newest entries.
    pub fn recent(&self, limit: usize) -> Vec<FeedEntry> {
        self.entries.read().iter().take(limit).cloned().collect()
    }

    /// Up to `limit` newest entries for one pool.
    pub fn for_pool(&self, pool_id: PoolId, limit: usize) -> Vec<FeedEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.pool_id == pool_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Entries held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
