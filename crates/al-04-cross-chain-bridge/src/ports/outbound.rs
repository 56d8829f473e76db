//! # Outbound Ports
//!
//! Source-chain wallet, attestation service, the relay into the ledger and
//! session persistence.

use crate::domain::{BridgeError, BridgeSession, SessionId, TxHash};
use al_03_transaction_builder::EvmCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{EthAddress, Hash, Lamports, PoolId};

/// Event log from a source-chain receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmLog {
    /// Emitting contract.
    pub address: EthAddress,
    /// Indexed topics; the first is the event signature hash.
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    #[serde(with = "shared_types::hex_serde")]
    pub data: Vec<u8>,
}

/// Mined source-chain transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmReceipt {
    /// Transaction hash.
    #[serde(with = "shared_types::hex_serde")]
    pub tx_hash: TxHash,
    /// `false` if the transaction reverted.
    pub success: bool,
    /// Emitted logs.
    pub logs: Vec<EvmLog>,
}

/// Source-chain wallet plus node: signs, sends and waits for receipts.
#[async_trait]
pub trait SourceChain: Send + Sync {
    /// Sign and send a call; returns its hash once broadcast.
    ///
    /// May block indefinitely on user approval in the wallet.
    async fn send_call(&self, call: &EvmCall) -> Result<TxHash, BridgeError>;

    /// Wait for the receipt of a sent transaction.
    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<EvmReceipt, BridgeError>;
}

/// Result of one attestation poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationStatus {
    /// Not yet available.
    Pending,
    /// Attestation bytes.
    Complete(Vec<u8>),
}

/// "Poll attestation by message identifier".
#[async_trait]
pub trait AttestationService: Send + Sync {
    /// One poll for `burn_id`.
    async fn fetch_attestation(&self, burn_id: &Hash) -> Result<AttestationStatus, BridgeError>;
}

/// What the ledger did with a relayed credit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Pool credited now.
    Credited {
        /// Amount credited
        amount: Lamports,
    },
    /// The attestation was consumed earlier; nothing changed.
    AlreadyCredited,
}

/// Issues the donate-equivalent credit on the primary chain.
#[async_trait]
pub trait DonationRelay: Send + Sync {
    /// Credit an attested burn to `pool_id`.
    async fn relay(
        &self,
        pool_id: PoolId,
        message: &[u8],
        attestation: &[u8],
    ) -> Result<RelayOutcome, BridgeError>;
}

/// Session persistence.
pub trait SessionStore: Send + Sync {
    /// Insert or replace.
    fn save(&self, session: &BridgeSession) -> Result<(), BridgeError>;

    /// Session by id.
    fn load(&self, id: &SessionId) -> Result<Option<BridgeSession>, BridgeError>;

    /// Session by burn identifier.
    fn find_by_burn(&self, burn_id: &Hash) -> Result<Option<BridgeSession>, BridgeError>;

    /// Every stored session, oldest first.
    fn list(&self) -> Result<Vec<BridgeSession>, BridgeError>;
}
