//! # Ports Layer
//!
//! Outbound traits for network and wallet access.

pub mod outbound;

pub use outbound::{AccountFetcher, BlockhashProvider, TransactionSubmitter, WalletSigner};
