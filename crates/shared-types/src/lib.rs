//! # Shared Types Crate
//!
//! Identity and amount types used by every ledger crate.
//!
//! It also carries the program-invocation shape (`Instruction`,
//! `AccountMeta`) shared by the settlement dispatcher and the transaction
//! builder.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, hashes and amount aliases are
//!   defined once here and re-used by settlement, builder and bridge.
//! - **Display is the wire form**: `Pubkey` prints as base58 and
//!   `EthAddress` as `0x`-prefixed hex, which is also how both serialize.

pub mod entities;
pub mod errors;
pub mod instruction;

pub use entities::*;
pub use errors::*;
pub use instruction::*;
