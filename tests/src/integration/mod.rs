//! Cross-crate integration tests.

pub mod bridge_recovery;
pub mod ledger_flows;
pub mod transaction_path;
