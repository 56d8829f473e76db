//! # Settlement Algorithms
//!
//! Pure functions used by the engine: attestation quorum counting and the
//! lazy daily-limit rollover.

pub mod attestation;
pub mod daily_limit;

pub use attestation::{count_valid_attesters, verify_attestation};
pub use daily_limit::{apply_withdrawal, rollover};
