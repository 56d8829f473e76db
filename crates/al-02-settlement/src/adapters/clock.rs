//! Clock adapters.

use crate::ports::outbound::ClockSource;
use shared_types::{UnixTimestamp, SECONDS_PER_DAY};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Settable clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Clock frozen at `timestamp`.
    pub fn at(timestamp: UnixTimestamp) -> Self {
        Self {
            now: AtomicI64::new(timestamp),
        }
    }

    /// Move to an absolute timestamp.
    pub fn set(&self, timestamp: UnixTimestamp) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.advance_secs(days * SECONDS_PER_DAY);
    }
}

impl ClockSource for ManualClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        self.now.load(Ordering::SeqCst)
    }
}
