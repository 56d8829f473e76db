//! # Domain Layer
//!
//! Sessions, states and errors.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{unix_now, BridgeSession};
pub use errors::BridgeError;
pub use value_objects::{
    BridgePolicy, BridgeRequest, BridgeState, SessionId, TxHash, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
