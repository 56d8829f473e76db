//! # Local Ledger Host
//!
//! An in-process stand-in for the primary chain. It serves liveness anchors,
//! accepts signed transactions, verifies every signature, and executes the
//! instruction against the settlement service. Statuses are reported as
//! finalized as soon as execution succeeds.
//!
//! Like the real network's preflight check, a transaction the program
//! rejects is refused at submission with the program's error code.

use al_02_settlement::{ClockSource, LedgerStore, SettlementApi, SettlementService};
use al_03_transaction_builder::{
    AccountData, AccountFetcher, BlockhashProvider, BuilderError, Commitment, LivenessAnchor,
    SignedTransaction, TransactionSubmitter, TxSignature, TxStatus,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::EventPublisher;
use shared_crypto::sha256;
use shared_types::{Hash, Lamports, Pubkey};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Blocks a blockhash stays usable for.
pub const BLOCKHASH_VALIDITY: u64 = 150;

/// JSON-RPC code the network answers with for an unknown blockhash.
pub const BLOCKHASH_NOT_FOUND: i64 = -32002;

#[derive(Default)]
struct HostState {
    height: u64,
    anchors: HashMap<Hash, u64>,
    statuses: HashMap<TxSignature, TxStatus>,
}

/// Primary chain hosted in process.
pub struct LocalLedger<S: LedgerStore, C: ClockSource, P: EventPublisher> {
    service: SettlementService<S, C, P>,
    state: Arc<Mutex<HostState>>,
}

impl<S: LedgerStore, C: ClockSource, P: EventPublisher> Clone for LocalLedger<S, C, P> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: LedgerStore, C: ClockSource, P: EventPublisher> LocalLedger<S, C, P> {
    /// Host executing against `service`.
    pub fn new(service: SettlementService<S, C, P>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(HostState::default())),
        }
    }

    /// Settlement service behind the host.
    pub fn service(&self) -> &SettlementService<S, C, P> {
        &self.service
    }

    /// Fund a wallet with native balance.
    pub async fn airdrop(&self, wallet: Pubkey, amount: Lamports) -> Result<Lamports, BuilderError> {
        Ok(self.service.deposit_native(wallet, amount).await?)
    }

    /// Produce blocks without transactions.
    pub fn advance_blocks(&self, count: u64) {
        self.state.lock().height += count;
    }

    fn check_anchor(&self, blockhash: &Hash) -> Result<(), BuilderError> {
        let state = self.state.lock();
        match state.anchors.get(blockhash) {
            Some(last_valid) if state.height <= *last_valid => Ok(()),
            Some(last_valid) => Err(BuilderError::BlockhashExpired {
                last_valid_block_height: *last_valid,
                current: state.height,
            }),
            None => Err(BuilderError::Rpc {
                code: BLOCKHASH_NOT_FOUND,
                message: "Blockhash not found".into(),
            }),
        }
    }
}

#[async_trait]
impl<S, C, P> BlockhashProvider for LocalLedger<S, C, P>
where
    S: LedgerStore + 'static,
    C: ClockSource + 'static,
    P: EventPublisher + 'static,
{
    async fn latest_anchor(&self) -> Result<LivenessAnchor, BuilderError> {
        let mut state = self.state.lock();
        state.height += 1;
        let mut seed = b"local-blockhash".to_vec();
        seed.extend_from_slice(&state.height.to_le_bytes());
        let blockhash = sha256(&seed);
        let last_valid_block_height = state.height + BLOCKHASH_VALIDITY;
        state.anchors.insert(blockhash, last_valid_block_height);
        Ok(LivenessAnchor {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn block_height(&self) -> Result<u64, BuilderError> {
        Ok(self.state.lock().height)
    }
}

#[async_trait]
impl<S, C, P> TransactionSubmitter for LocalLedger<S, C, P>
where
    S: LedgerStore + 'static,
    C: ClockSource + 'static,
    P: EventPublisher + 'static,
{
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxSignature, BuilderError> {
        let wire = tx.serialize();
        let tx = SignedTransaction::deserialize(&wire)?;
        tx.verify()?;
        let id = tx
            .id()
            .ok_or_else(|| BuilderError::Malformed("transaction has no signatures".into()))?;
        self.check_anchor(&tx.message.recent_blockhash)?;

        let instructions = tx.message.decompile()?;
        let [instruction] = instructions.as_slice() else {
            return Err(BuilderError::Malformed(format!(
                "local host executes one instruction per transaction, got {}",
                instructions.len()
            )));
        };
        let signers = tx.message.signers().to_vec();

        match self.service.execute(instruction, &signers).await {
            Ok(outcome) => {
                let mut state = self.state.lock();
                let slot = state.height;
                state.statuses.insert(
                    id,
                    TxStatus {
                        slot,
                        confirmation: Some(Commitment::Finalized),
                        error: None,
                    },
                );
                info!("[host] {} executed in slot {}: {}", outcome.operation(), slot, id);
                Ok(id)
            }
            Err(e) => {
                warn!("[host] Preflight rejected {}: {}", id, e);
                Err(BuilderError::from_program_failure(
                    Some(e.code().as_u32()),
                    e.to_string(),
                ))
            }
        }
    }

    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TxStatus>, BuilderError> {
        Ok(self.state.lock().statuses.get(signature).cloned())
    }
}

#[async_trait]
impl<S, C, P> AccountFetcher for LocalLedger<S, C, P>
where
    S: LedgerStore + 'static,
    C: ClockSource + 'static,
    P: EventPublisher + 'static,
{
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountData>, BuilderError> {
        debug!("[host] getAccountInfo {}", address);
        Ok(self
            .service
            .account(*address)
            .await?
            .map(|snapshot| AccountData {
                lamports: snapshot.lamports,
                data: snapshot.data,
                owner: snapshot.owner,
            }))
    }

    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountData>>, BuilderError> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            accounts.push(self.fetch_account(address).await?);
        }
        Ok(accounts)
    }
}
