//! # Ports Layer
//!
//! Hexagonal boundaries of the settlement component.

pub mod inbound;
pub mod outbound;

pub use inbound::SettlementApi;
pub use outbound::{ClockSource, LedgerStore, RecordKey, WriteBatch};
