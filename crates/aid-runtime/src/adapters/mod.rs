//! # Adapters
//!
//! Runtime-side implementations of the builder's network ports.

pub mod local_ledger;

pub use local_ledger::{LocalLedger, BLOCKHASH_NOT_FOUND, BLOCKHASH_VALIDITY};
