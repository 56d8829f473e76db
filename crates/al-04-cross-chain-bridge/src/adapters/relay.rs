//! Relays that credit an attested burn on the primary chain.
//!
//! - [`SettlementRelay`] calls an in-process settlement service directly.
//! - [`LedgerClientRelay`] builds, signs and submits a credit transaction.
//!
//! Both report a replayed attestation as [`RelayOutcome::AlreadyCredited`],
//! which is what makes resuming after a lost confirmation safe.

use crate::domain::BridgeError;
use crate::ports::outbound::{DonationRelay, RelayOutcome};
use al_02_settlement::{
    CctpMessage, ClockSource, ErrorCode, LedgerStore, SettlementApi, SettlementError,
    SettlementService,
};
use al_03_transaction_builder::{
    BlockhashProvider, BuilderError, Intent, LedgerClient, TransactionSubmitter, WalletSigner,
};
use async_trait::async_trait;
use shared_bus::EventPublisher;
use shared_types::{PoolId, Pubkey};
use tracing::{info, warn};

/// Relay into an in-process settlement service.
pub struct SettlementRelay<S: LedgerStore, C: ClockSource, P: EventPublisher> {
    service: SettlementService<S, C, P>,
}

impl<S: LedgerStore, C: ClockSource, P: EventPublisher> SettlementRelay<S, C, P> {
    /// Wrap a service handle.
    pub fn new(service: SettlementService<S, C, P>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S, C, P> DonationRelay for SettlementRelay<S, C, P>
where
    S: LedgerStore + 'static,
    C: ClockSource + 'static,
    P: EventPublisher + 'static,
{
    async fn relay(
        &self,
        pool_id: PoolId,
        message: &[u8],
        attestation: &[u8],
    ) -> Result<RelayOutcome, BridgeError> {
        let config = self
            .service
            .config()
            .await
            .map_err(|e| BridgeError::Relay(e.to_string()))?;
        match self
            .service
            .credit_bridged_donation(&config, pool_id, message.to_vec(), attestation.to_vec())
            .await
        {
            Ok(receipt) => Ok(RelayOutcome::Credited {
                amount: receipt.amount,
            }),
            Err(SettlementError::AttestationAlreadyConsumed) => {
                info!("[al-04] Attestation already consumed; pool {} was credited", pool_id);
                Ok(RelayOutcome::AlreadyCredited)
            }
            Err(e) => Err(BridgeError::RelayRejected(e.to_string())),
        }
    }
}

/// Relay that submits a credit transaction signed by a relayer wallet.
pub struct LedgerClientRelay<N, W> {
    client: LedgerClient<N, W>,
    relayer: Pubkey,
}

impl<N, W> LedgerClientRelay<N, W>
where
    N: BlockhashProvider + TransactionSubmitter,
    W: WalletSigner,
{
    /// Relay paying fees from `relayer`, which must be the client's wallet.
    pub fn new(client: LedgerClient<N, W>, relayer: Pubkey) -> Self {
        Self { client, relayer }
    }
}

#[async_trait]
impl<N, W> DonationRelay for LedgerClientRelay<N, W>
where
    N: BlockhashProvider + TransactionSubmitter + 'static,
    W: WalletSigner + 'static,
{
    async fn relay(
        &self,
        pool_id: PoolId,
        message: &[u8],
        attestation: &[u8],
    ) -> Result<RelayOutcome, BridgeError> {
        let amount = CctpMessage::decode(message)
            .map_err(|e| BridgeError::RelayRejected(e.to_string()))?
            .body
            .amount;
        let intent = Intent::CreditBridged {
            relayer: self.relayer,
            pool_id,
            message: message.to_vec(),
            attestation: attestation.to_vec(),
        };
        match self.client.execute(&intent).await {
            Ok(signature) => {
                info!("[al-04] Credit confirmed: {}", signature);
                Ok(RelayOutcome::Credited { amount })
            }
            Err(BuilderError::Rejected(ErrorCode::AttestationAlreadyConsumed)) => {
                Ok(RelayOutcome::AlreadyCredited)
            }
            Err(e) if e.is_retryable() => {
                warn!("[al-04] Credit submission failed: {}", e);
                Err(BridgeError::Relay(e.to_string()))
            }
            Err(e) => Err(BridgeError::RelayRejected(e.to_string())),
        }
    }
}
