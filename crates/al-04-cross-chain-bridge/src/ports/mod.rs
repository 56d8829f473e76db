//! # Ports Layer
//!
//! Inbound bridge API and outbound collaborator traits.

pub mod inbound;
pub mod outbound;

pub use inbound::BridgeApi;
pub use outbound::{
    AttestationService, AttestationStatus, DonationRelay, EvmLog, EvmReceipt, RelayOutcome,
    SessionStore, SourceChain,
};
