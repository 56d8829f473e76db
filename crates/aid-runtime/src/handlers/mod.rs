//! # Event Handlers
//!
//! Background consumers of the ledger event bus.

pub mod feed_projector;

pub use feed_projector::FeedProjector;
