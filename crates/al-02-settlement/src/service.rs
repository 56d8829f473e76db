//! # Settlement Service
//!
//! Wraps the engine for concurrent callers and announces every committed
//! change on the event bus.
//!
//! A single write lock stands in for the host's write serialization. It is
//! held until the event for an operation is published, so subscribers see
//! events in commit order.

use crate::dispatch::ExecutionOutcome;
use crate::domain::{
    BridgedCreditReceipt, DonationReceipt, GlobalConfig, NgoRecord, Pool, SettlementError,
    WithdrawalReceipt,
};
use crate::engine::{AccountSnapshot, SettlementEngine};
use crate::ports::inbound::SettlementApi;
use crate::ports::outbound::{ClockSource, LedgerStore};
use aid_telemetry::metrics::{
    DONATED_AMOUNT, DONATIONS, REJECTIONS, WITHDRAWALS, WITHDRAWN_AMOUNT,
};
use aid_telemetry::{log_ledger_event, metric_inc};
use al_01_address_derivation::AddressDeriver;
use async_trait::async_trait;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{EthAddress, Instruction, Lamports, PoolId, Pubkey};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

const COMPONENT: &str = "al-02";

/// Statistics for the settlement service.
#[derive(Debug, Default, Clone)]
pub struct SettlementStats {
    /// Operations committed.
    pub committed: u64,
    /// Operations rejected.
    pub rejected: u64,
    /// Direct donations applied.
    pub donations: u64,
    /// Bridged credits applied.
    pub bridged_credits: u64,
    /// Withdrawals paid out.
    pub withdrawals: u64,
    /// Sum credited (direct and bridged).
    pub total_credited: u128,
    /// Sum withdrawn.
    pub total_withdrawn: u128,
}

/// The settlement service.
pub struct SettlementService<S: LedgerStore, C: ClockSource, P: EventPublisher> {
    engine: Arc<RwLock<SettlementEngine<S, C>>>,
    publisher: Arc<P>,
    deriver: AddressDeriver,
    stats: Arc<RwLock<SettlementStats>>,
}

impl<S: LedgerStore, C: ClockSource, P: EventPublisher> Clone for SettlementService<S, C, P> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            publisher: Arc::clone(&self.publisher),
            deriver: self.deriver,
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<S: LedgerStore, C: ClockSource, P: EventPublisher> SettlementService<S, C, P> {
    /// Wrap an engine.
    pub fn new(engine: SettlementEngine<S, C>, publisher: Arc<P>) -> Self {
        let deriver = *engine.deriver();
        Self {
            engine: Arc::new(RwLock::new(engine)),
            publisher,
            deriver,
            stats: Arc::new(RwLock::new(SettlementStats::default())),
        }
    }

    /// Current statistics.
    pub async fn stats(&self) -> SettlementStats {
        self.stats.read().await.clone()
    }

    /// Address deriver of the wrapped engine.
    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    /// Credit native balance to an address.
    pub async fn deposit_native(
        &self,
        address: Pubkey,
        amount: Lamports,
    ) -> Result<Lamports, SettlementError> {
        self.engine.write().await.deposit_native(&address, amount)
    }

    /// Native balance of any address.
    pub async fn balance(&self, address: Pubkey) -> Result<Lamports, SettlementError> {
        self.engine.read().await.balance(&address)
    }

    /// Raw account view.
    pub async fn account(
        &self,
        address: Pubkey,
    ) -> Result<Option<AccountSnapshot>, SettlementError> {
        self.engine.read().await.account(&address)
    }

    /// What an NGO may still withdraw today.
    pub async fn remaining_allowance(
        &self,
        wallet: Pubkey,
    ) -> Result<Option<Lamports>, SettlementError> {
        self.engine.read().await.remaining_allowance(&wallet)
    }

    /// Run `f` against a read-locked engine.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&SettlementEngine<S, C>) -> R) -> R {
        let engine = self.engine.read().await;
        f(&engine)
    }

    async fn finish<T: Clone>(
        &self,
        operation: &'static str,
        result: Result<T, SettlementError>,
        outcome: fn(T) -> ExecutionOutcome,
    ) -> Result<T, SettlementError> {
        match result {
            Ok(value) => {
                self.on_committed(outcome(value.clone())).await;
                Ok(value)
            }
            Err(err) => {
                self.on_rejected(operation, &err).await;
                Err(err)
            }
        }
    }

    async fn on_committed(&self, outcome: ExecutionOutcome) {
        {
            let mut stats = self.stats.write().await;
            stats.committed += 1;
            match &outcome {
                ExecutionOutcome::Donated(r) => {
                    stats.donations += 1;
                    stats.total_credited += u128::from(r.amount);
                }
                ExecutionOutcome::BridgedCredited(r) => {
                    stats.bridged_credits += 1;
                    stats.total_credited += u128::from(r.amount);
                }
                ExecutionOutcome::Withdrawn(r) => {
                    stats.withdrawals += 1;
                    stats.total_withdrawn += u128::from(r.amount);
                }
                _ => {}
            }
        }

        let event = match outcome {
            ExecutionOutcome::Initialized(config) => {
                info!(admin = %config.admin, threshold = config.attestation_threshold,
                    "[{COMPONENT}] Ledger initialized");
                LedgerEvent::ConfigInitialized {
                    admin: config.admin,
                    attester_count: config.attesters.len(),
                    threshold: config.attestation_threshold,
                }
            }
            ExecutionOutcome::PoolCreated(pool) => {
                let address = self
                    .deriver
                    .pool(pool.id)
                    .map(|d| d.address)
                    .unwrap_or_default();
                info!(pool_id = pool.id, name = %pool.name, address = %address,
                    "[{COMPONENT}] Pool created");
                LedgerEvent::PoolCreated {
                    pool_id: pool.id,
                    name: pool.name,
                    address,
                }
            }
            ExecutionOutcome::PoolStatusChanged(pool) => {
                info!(pool_id = pool.id, active = pool.is_active, "[{COMPONENT}] Pool status changed");
                LedgerEvent::PoolStatusChanged {
                    pool_id: pool.id,
                    is_active: pool.is_active,
                }
            }
            ExecutionOutcome::Donated(r) => {
                metric_inc!(DONATIONS, &["direct"]);
                DONATED_AMOUNT.inc_by(r.amount);
                log_ledger_event!(info, COMPONENT, "Donation received", r.pool_id, r.amount,
                    donor = %r.donor, total_donated = r.total_donated);
                LedgerEvent::DonationReceived {
                    pool_id: r.pool_id,
                    donor: r.donor,
                    amount: r.amount,
                    timestamp: r.timestamp,
                }
            }
            ExecutionOutcome::NgoRegistered(ngo) => {
                info!(wallet = %ngo.wallet, pools = ?ngo.allowed_pools, daily_limit = ngo.daily_limit,
                    "[{COMPONENT}] NGO registered");
                LedgerEvent::NgoRegistered {
                    wallet: ngo.wallet,
                    allowed_pools: ngo.allowed_pools,
                    daily_limit: ngo.daily_limit,
                }
            }
            ExecutionOutcome::Withdrawn(r) => {
                metric_inc!(WITHDRAWALS);
                WITHDRAWN_AMOUNT.inc_by(r.amount);
                log_ledger_event!(info, COMPONENT, "Withdrawal executed", r.pool_id, r.amount,
                    ngo = %r.ngo_wallet, withdrawn_today = r.withdrawn_today);
                LedgerEvent::WithdrawalExecuted {
                    pool_id: r.pool_id,
                    ngo_wallet: r.ngo_wallet,
                    amount: r.amount,
                    timestamp: r.timestamp,
                    withdrawn_today: r.withdrawn_today,
                }
            }
            ExecutionOutcome::BridgedCredited(r) => {
                metric_inc!(DONATIONS, &["bridged"]);
                DONATED_AMOUNT.inc_by(r.amount);
                log_ledger_event!(info, COMPONENT, "Bridged donation credited", r.pool_id, r.amount,
                    nonce = r.nonce, source_domain = r.source_domain);
                LedgerEvent::BridgedDonationCredited {
                    pool_id: r.pool_id,
                    amount: r.amount,
                    message_hash: r.message_hash,
                    nonce: r.nonce,
                    source_domain: r.source_domain,
                    timestamp: r.timestamp,
                }
            }
        };
        self.publisher.publish(event).await;
    }

    async fn on_rejected(&self, operation: &str, err: &SettlementError) {
        let code = err.code().as_u32();
        warn!(operation, code, category = ?err.category(), "[{COMPONENT}] Rejected: {err}");
        let code_label = code.to_string();
        REJECTIONS
            .with_label_values(&[operation, code_label.as_str()])
            .inc();
        self.stats.write().await.rejected += 1;
        self.publisher
            .publish(LedgerEvent::OperationRejected {
                operation: operation.to_string(),
                code,
                reason: err.to_string(),
            })
            .await;
    }
}

#[async_trait]
impl<S, C, P> SettlementApi for SettlementService<S, C, P>
where
    S: LedgerStore + 'static,
    C: ClockSource + 'static,
    P: EventPublisher + 'static,
{
    #[instrument(skip(self, attesters))]
    async fn initialize(
        &self,
        admin: Pubkey,
        attesters: Vec<EthAddress>,
        threshold: u8,
        local_domain: u32,
    ) -> Result<GlobalConfig, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.initialize(&admin, &attesters, threshold, local_domain);
        self.finish("initialize", result, ExecutionOutcome::Initialized)
            .await
    }

    #[instrument(skip(self, config))]
    async fn create_pool(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        id: PoolId,
        name: String,
    ) -> Result<Pool, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.create_pool(config, &signer, id, &name);
        self.finish("create_pool", result, ExecutionOutcome::PoolCreated)
            .await
    }

    #[instrument(skip(self, config))]
    async fn set_pool_active(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        pool_id: PoolId,
        active: bool,
    ) -> Result<Pool, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.set_pool_active(config, &signer, pool_id, active);
        self.finish("set_pool_active", result, ExecutionOutcome::PoolStatusChanged)
            .await
    }

    #[instrument(skip(self))]
    async fn donate_to_pool(
        &self,
        donor: Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<DonationReceipt, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.donate_to_pool(&donor, pool_id, amount);
        self.finish("donate_to_pool", result, ExecutionOutcome::Donated)
            .await
    }

    #[instrument(skip(self, config))]
    async fn register_ngo(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        wallet: Pubkey,
        allowed_pools: Vec<PoolId>,
        daily_limit: Lamports,
    ) -> Result<NgoRecord, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.register_ngo(config, &signer, &wallet, &allowed_pools, daily_limit);
        self.finish("register_ngo", result, ExecutionOutcome::NgoRegistered)
            .await
    }

    #[instrument(skip(self))]
    async fn withdraw_from_pool(
        &self,
        signer: Pubkey,
        ngo_wallet: Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<WithdrawalReceipt, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.withdraw_from_pool(&signer, &ngo_wallet, pool_id, amount);
        self.finish("withdraw_from_pool", result, ExecutionOutcome::Withdrawn)
            .await
    }

    #[instrument(skip(self, config, message, attestation))]
    async fn credit_bridged_donation(
        &self,
        config: &GlobalConfig,
        pool_id: PoolId,
        message: Vec<u8>,
        attestation: Vec<u8>,
    ) -> Result<BridgedCreditReceipt, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.credit_bridged_donation(config, pool_id, &message, &attestation);
        self.finish(
            "credit_bridged_donation",
            result,
            ExecutionOutcome::BridgedCredited,
        )
        .await
    }

    #[instrument(skip(self, instruction, signers))]
    async fn execute(
        &self,
        instruction: &Instruction,
        signers: &[Pubkey],
    ) -> Result<ExecutionOutcome, SettlementError> {
        let mut engine = self.engine.write().await;
        let result = engine.execute(instruction, signers);
        self.finish("execute", result, |outcome| outcome).await
    }

    async fn config(&self) -> Result<GlobalConfig, SettlementError> {
        self.engine.read().await.config()
    }

    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, SettlementError> {
        self.engine.read().await.get_pool(id)
    }

    async fn get_ngo(&self, wallet: Pubkey) -> Result<Option<NgoRecord>, SettlementError> {
        self.engine.read().await.get_ngo(&wallet)
    }

    async fn pool_balance(&self, id: PoolId) -> Result<Lamports, SettlementError> {
        self.engine.read().await.pool_balance(id)
    }
}
