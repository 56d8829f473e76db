//! # AL-03 Transaction Builder
//!
//! Turns intents into exact unsigned operations and sees them through to
//! confirmation.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! Intent ──validate──→ Instruction ──compile + anchor──→ UnsignedTransaction
//!                                                              │
//!                                  WalletSigner (external) ←───┘
//!                                          │
//!                     SignedTransaction ──submit_and_confirm──→ TxSignature
//! ```
//!
//! ## Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | Malformed intents never reach the network | `Intent::validate` before building |
//! | Accounts located by derivation, not lookup | `AddressDeriver` |
//! | Built against a fresh anchor | `BlockhashProvider::latest_anchor` |
//! | Never signs | `WalletSigner` port |
//! | `Processed` is not success | `ConfirmationPolicy` floor is `Confirmed` |
//! | Expired anchors stop the wait | `BlockhashExpired` past `last_valid_block_height` |
//!
//! ## Module Structure
//!
//! ```text
//! al-03-transaction-builder/
//! ├── domain/          # intents, messages, anchors, EVM calls, errors
//! ├── algorithms/      # legacy message compilation, ABI calldata
//! ├── ports/           # network and wallet traits
//! ├── adapters/        # JSON-RPC client, keypair wallet
//! ├── builder.rs       # intent → instruction / transaction / bridge calls
//! ├── submit.rs        # confirmation policy, LedgerClient
//! └── reader.rs        # account read path
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod builder;
pub mod domain;
pub mod ports;
pub mod reader;
pub mod submit;

// Re-exports
pub use adapters::{KeypairSigner, SolanaRpcClient};
pub use algorithms::{compile_message, encode_approve, encode_deposit_for_burn};
pub use builder::TransactionBuilder;
pub use domain::{
    AccountData, BridgeCalls, BridgeIntent, BuilderError, Commitment, EvmCall, EvmNetwork,
    Intent, LivenessAnchor, Message, ProgramFailure, SignedTransaction, TxSignature, TxStatus,
    UnsignedTransaction,
};
pub use ports::{AccountFetcher, BlockhashProvider, TransactionSubmitter, WalletSigner};
pub use reader::{LedgerReader, PoolAccount, KNOWN_POOL_IDS};
pub use submit::{submit_and_confirm, ConfirmationPolicy, LedgerClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
