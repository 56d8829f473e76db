//! Per-NGO daily withdrawal limit.
//!
//! The counter resets lazily: there is no timer, the first withdrawal on a
//! new day zeroes `withdrawn_today` before the limit is checked.

use crate::domain::{NgoRecord, SettlementError};
use shared_types::{DayIndex, Lamports};

/// Reset the counter if `today` differs from the recorded day.
pub fn rollover(ngo: &mut NgoRecord, today: DayIndex) {
    if ngo.last_withdraw_day != today {
        ngo.withdrawn_today = 0;
        ngo.last_withdraw_day = today;
    }
}

/// Count `amount` against the limit, returning the new daily total.
///
/// `ngo` must already be rolled over to the current day. It is not
/// modified; the caller writes the returned total on success.
pub fn apply_withdrawal(ngo: &NgoRecord, amount: Lamports) -> Result<Lamports, SettlementError> {
    let total = ngo
        .withdrawn_today
        .checked_add(amount)
        .ok_or(SettlementError::Overflow)?;
    if total > ngo.daily_limit {
        return Err(SettlementError::DailyLimitExceeded {
            requested: amount,
            withdrawn_today: ngo.withdrawn_today,
            daily_limit: ngo.daily_limit,
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Pubkey;

    fn ngo(withdrawn: Lamports, day: DayIndex) -> NgoRecord {
        NgoRecord {
            wallet: Pubkey::new([2u8; 32]),
            is_active: true,
            allowed_pools: vec![0],
            daily_limit: 500,
            withdrawn_today: withdrawn,
            last_withdraw_day: day,
            bump: 255,
        }
    }

    #[test]
    fn test_limit_is_inclusive() {
        assert_eq!(apply_withdrawal(&ngo(0, 1), 500).unwrap(), 500);
        assert!(matches!(
            apply_withdrawal(&ngo(500, 1), 1),
            Err(SettlementError::DailyLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_rollover_resets_on_new_day() {
        let mut record = ngo(500, 1);
        rollover(&mut record, 1);
        assert_eq!(record.withdrawn_today, 500);

        rollover(&mut record, 2);
        assert_eq!(record.withdrawn_today, 0);
        assert_eq!(record.last_withdraw_day, 2);
        assert_eq!(apply_withdrawal(&record, 500).unwrap(), 500);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut record = ngo(u64::MAX, 1);
        record.daily_limit = u64::MAX;
        assert_eq!(apply_withdrawal(&record, 1), Err(SettlementError::Overflow));
    }
}
