//! # AL-02 Settlement
//!
//! Relief-pool ledger: pools, the NGO authorization registry and the
//! settlement engine that moves funds between them.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Operations
//!
//! | Operation | Caller | Effect |
//! |-----------|--------|--------|
//! | `initialize` | admin | Create the configuration singleton |
//! | `create_pool` | admin | New active pool |
//! | `set_pool_active` | admin | Deactivate / reactivate a pool |
//! | `register_ngo` | admin | Create or overwrite an NGO record |
//! | `donate_to_pool` | anyone | Donor balance → pool |
//! | `withdraw_from_pool` | NGO | Pool → NGO, within its daily limit |
//! | `credit_bridged_donation` | anyone | Attested cross-chain burn → pool |
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `total_withdrawn ≤ total_donated` | withdrawal capped by outstanding balance |
//! | `withdrawn_today ≤ daily_limit` | checked after lazy day rollover |
//! | NGO active, pool active, pool allowed | checked before any mutation |
//! | Each burn credited once | consumed message-hash set |
//! | No wraparound | checked arithmetic, `Overflow` |
//!
//! ## Module Structure
//!
//! ```text
//! al-02-settlement/
//! ├── domain/          # Pool, NgoRecord, GlobalConfig, receipts, errors
//! ├── algorithms/      # attestation quorum, daily limit
//! ├── codec/           # account layouts, instruction data, CCTP message
//! ├── ports/           # SettlementApi, LedgerStore, ClockSource
//! ├── adapters/        # in-memory store, clocks
//! ├── engine.rs        # typed operations
//! ├── dispatch.rs      # wire instruction execution
//! ├── query.rs         # read-model helpers
//! ├── feed.rs          # recent-activity feed
//! └── service.rs       # locking, events, metrics
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod codec;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod feed;
pub mod ports;
pub mod query;
pub mod service;

// Re-exports
pub use adapters::{InMemoryLedgerStore, ManualClock, SystemClock};
pub use algorithms::{count_valid_attesters, verify_attestation};
pub use codec::{
    decode_account, encode_account, AccountRecord, BurnMessage, CctpMessage, CodecError,
    LedgerInstruction,
};
pub use dispatch::ExecutionOutcome;
pub use domain::{
    BridgedCreditReceipt, DonationReceipt, ErrorCategory, ErrorCode, GlobalConfig, NgoRecord,
    Pool, SettlementError, WithdrawalReceipt, MAX_ALLOWED_POOLS, MAX_ATTESTERS,
    MAX_POOL_NAME_LEN, PRIMARY_CHAIN_DOMAIN,
};
pub use engine::{AccountSnapshot, SettlementEngine};
pub use feed::{FeedEntry, FeedKind, TransactionFeed};
pub use ports::{ClockSource, LedgerStore, RecordKey, SettlementApi, WriteBatch};
pub use query::{LedgerTotals, PoolSummary};
pub use service::{SettlementService, SettlementStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
