//! # Algorithms
//!
//! Wire-level encodings: legacy primary-chain messages and EVM calldata.

pub mod abi;
pub mod message;

pub use abi::{encode_approve, encode_deposit_for_burn};
pub use message::{compile_message, encode_length, MAX_ACCOUNT_KEYS, PACKET_DATA_SIZE};
