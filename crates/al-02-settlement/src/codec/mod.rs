//! # Wire Codecs
//!
//! Byte layouts shared with the chain: account records, instruction data
//! and the cross-chain burn message.

pub mod accounts;
pub mod cctp;
pub mod instructions;

pub use accounts::{
    decode_account, encode_account, AccountRecord, CONFIG_DISCRIMINATOR, NGO_DISCRIMINATOR,
    POOL_DISCRIMINATOR,
};
pub use cctp::{split_attestation, BurnMessage, CctpMessage, BURN_MESSAGE_LEN, HEADER_LEN};
pub use instructions::LedgerInstruction;

use thiserror::Error;

/// Errors from encoding or decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input shorter than the fixed part of the layout.
    #[error("Data too short: need {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    /// Account type tag does not match the expected record.
    #[error("Discriminator mismatch: expected {expected} account")]
    DiscriminatorMismatch { expected: &'static str },

    /// Instruction discriminator not recognised.
    #[error("Unknown instruction discriminator: {0:?}")]
    UnknownInstruction([u8; 8]),

    /// Borsh (de)serialization failed.
    #[error("Borsh error: {0}")]
    Borsh(String),

    /// Value does not fit the ledger's amount type.
    #[error("Amount exceeds u64 range")]
    AmountOverflow,

    /// Unsupported message or body version.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u32),
}
