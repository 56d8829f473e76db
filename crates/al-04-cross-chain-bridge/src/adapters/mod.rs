//! # Adapters
//!
//! Session stores, the attestation service client, the source-chain wallet,
//! relays into the ledger and simulated chains for tests and local runs.

pub mod evm_rpc;
pub mod iris;
pub mod json_store;
pub mod memory_store;
pub mod relay;
pub mod simulated;

pub use evm_rpc::EvmRpcWallet;
pub use iris::{IrisAttestationClient, IRIS_SANDBOX_URL};
pub use json_store::JsonFileSessionStore;
pub use memory_store::InMemorySessionStore;
pub use relay::{LedgerClientRelay, SettlementRelay};
pub use simulated::{
    SimulatedAttestationService, SimulatedSourceChain, SourceChainFaults,
    SEPOLIA_MESSAGE_TRANSMITTER,
};
