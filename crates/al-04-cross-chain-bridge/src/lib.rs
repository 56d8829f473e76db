//! # AL-04 Cross-Chain Bridge
//!
//! Moves a donation from the secondary chain into a pool: approve, burn,
//! wait for the attestation, then credit the pool on the primary chain.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Session Lifecycle
//!
//! ```text
//! Idle → Approving → Burning → AwaitingAttestation → Attested → Relayed
//!            │          │               │                 │
//!            └→ Failed ←┘               └──→ Stuck ←──────┘
//!                 (pre-burn only)          (resumable)
//! ```
//!
//! ## Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | No lost burns | burn tx hash persisted before its receipt is awaited |
//! | No double burns | resume never resends a recorded burn |
//! | No double credits | ledger consumes each attestation once; replay is success |
//! | Failed means nothing left the source chain | `Failed` unreachable after the burn confirms |
//! | One driver per session | in-flight set, `SessionBusy` |
//! | Bounded polling | `BridgePolicy::max_attempts`, then `Stuck` |
//!
//! ## Module Structure
//!
//! ```text
//! al-04-cross-chain-bridge/
//! ├── domain/          # session, states, policy, errors
//! ├── algorithms/      # MessageSent log decoding, burn id
//! ├── ports/           # BridgeApi, source chain, attestation, relay, store
//! ├── adapters/        # JSON-RPC wallet, attestation client, stores, relays, simulators
//! └── orchestrator.rs  # the state machine driver
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod orchestrator;
pub mod ports;

// Re-exports
pub use adapters::{
    EvmRpcWallet, InMemorySessionStore, IrisAttestationClient, JsonFileSessionStore,
    LedgerClientRelay, SettlementRelay, SimulatedAttestationService, SimulatedSourceChain,
    SourceChainFaults, IRIS_SANDBOX_URL,
};
pub use algorithms::{burn_id, extract_message, message_sent_topic};
pub use domain::{
    BridgeError, BridgePolicy, BridgeRequest, BridgeSession, BridgeState, SessionId,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};
pub use orchestrator::BridgeOrchestrator;
pub use ports::{
    AttestationService, AttestationStatus, BridgeApi, DonationRelay, EvmLog, EvmReceipt,
    RelayOutcome, SessionStore, SourceChain,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
