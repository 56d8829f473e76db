//! # Domain Layer
//!
//! Intents, transactions, network entities and errors.

pub mod entities;
pub mod errors;
pub mod evm;
pub mod intents;
pub mod transaction;

pub use entities::{
    AccountData, Commitment, LivenessAnchor, ProgramFailure, TxSignature, TxStatus,
};
pub use errors::BuilderError;
pub use evm::{
    BridgeCalls, EvmCall, EvmNetwork, ETHEREUM_DOMAIN, SEPOLIA_CHAIN_ID, SEPOLIA_TOKEN_MESSENGER,
    SEPOLIA_USDC,
};
pub use intents::{BridgeIntent, Intent};
pub use transaction::{
    CompiledInstruction, Message, MessageHeader, SignedTransaction, UnsignedTransaction,
};
