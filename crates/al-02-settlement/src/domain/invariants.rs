//! # Domain Invariants
//!
//! Business rules that must hold at every observed ledger state.

use super::entities::{NgoRecord, Pool, MAX_POOL_NAME_LEN};
use super::errors::SettlementError;
use shared_types::{Lamports, PoolId};

/// Invariant: a pool never pays out more than it took in.
pub fn invariant_pool_conservation(pool: &Pool) -> bool {
    pool.total_withdrawn <= pool.total_donated
}

/// Invariant: the pool account holds at least what is still owed.
pub fn invariant_pool_solvency(pool: &Pool, balance: Lamports) -> bool {
    balance >= pool.outstanding()
}

/// Invariant: an NGO's counted withdrawals stay within its limit.
pub fn invariant_daily_limit(ngo: &NgoRecord) -> bool {
    ngo.withdrawn_today <= ngo.daily_limit
}

/// Invariant: withdrawal requires an active NGO, an active pool and an
/// allow-list entry.
pub fn invariant_withdrawal_authorized(ngo: &NgoRecord, pool: &Pool) -> bool {
    ngo.is_active && pool.is_active && ngo.is_allowed(pool.id)
}

/// Pool names are bounded so the account has a fixed maximum size.
pub fn validate_pool_name(name: &str) -> Result<(), SettlementError> {
    if name.len() > MAX_POOL_NAME_LEN {
        return Err(SettlementError::NameTooLong {
            len: name.len(),
            max: MAX_POOL_NAME_LEN,
        });
    }
    Ok(())
}

/// Drop repeated ids, keeping first occurrence order.
pub fn dedup_pool_ids(ids: &[PoolId]) -> Vec<PoolId> {
    let mut out: Vec<PoolId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Pubkey;

    fn ngo() -> NgoRecord {
        NgoRecord {
            wallet: Pubkey::new([4u8; 32]),
            is_active: true,
            allowed_pools: vec![0],
            daily_limit: 100,
            withdrawn_today: 100,
            last_withdraw_day: 0,
            bump: 250,
        }
    }

    #[test]
    fn test_conservation() {
        let mut pool = Pool::new(0, "Gaza", 255);
        pool.total_donated = 10;
        pool.total_withdrawn = 10;
        assert!(invariant_pool_conservation(&pool));
        pool.total_withdrawn = 11;
        assert!(!invariant_pool_conservation(&pool));
    }

    #[test]
    fn test_solvency() {
        let mut pool = Pool::new(0, "Gaza", 255);
        pool.total_donated = 10;
        pool.total_withdrawn = 4;
        assert!(invariant_pool_solvency(&pool, 6));
        assert!(!invariant_pool_solvency(&pool, 5));
    }

    #[test]
    fn test_daily_limit_boundary() {
        let mut record = ngo();
        assert!(invariant_daily_limit(&record));
        record.withdrawn_today = 101;
        assert!(!invariant_daily_limit(&record));
    }

    #[test]
    fn test_authorization_needs_all_three() {
        let record = ngo();
        let pool = Pool::new(0, "Sudan", 255);
        assert!(invariant_withdrawal_authorized(&record, &pool));

        let other = Pool::new(1, "Other", 255);
        assert!(!invariant_withdrawal_authorized(&record, &other));

        let mut closed = pool.clone();
        closed.is_active = false;
        assert!(!invariant_withdrawal_authorized(&record, &closed));
    }

    #[test]
    fn test_pool_name_limit() {
        assert!(validate_pool_name(&"a".repeat(64)).is_ok());
        assert_eq!(
            validate_pool_name(&"a".repeat(65)),
            Err(SettlementError::NameTooLong { len: 65, max: 64 })
        );
    }

    #[test]
    fn test_dedup_keeps_order() {
        assert_eq!(dedup_pool_ids(&[2, 0, 2, 1, 0]), vec![2, 0, 1]);
    }
}
