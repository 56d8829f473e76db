//! # Domain Layer
//!
//! Records, receipts, invariants and errors of the relief-pool ledger.

pub mod entities;
pub mod errors;
pub mod invariants;

pub use entities::{
    BridgedCreditReceipt, DonationReceipt, GlobalConfig, NgoRecord, Pool, WithdrawalReceipt,
    MAX_ALLOWED_POOLS, MAX_ATTESTERS, MAX_POOL_NAME_LEN, PRIMARY_CHAIN_DOMAIN,
};
pub use errors::{ErrorCategory, ErrorCode, SettlementError};
pub use invariants::{
    dedup_pool_ids, invariant_daily_limit, invariant_pool_conservation, invariant_pool_solvency,
    invariant_withdrawal_authorized, validate_pool_name,
};
