//! # Inbound Ports (Driving Ports)
//!
//! The API the settlement component offers to hosts, relays and tests.

use crate::dispatch::ExecutionOutcome;
use crate::domain::{
    BridgedCreditReceipt, DonationReceipt, GlobalConfig, NgoRecord, Pool, SettlementError,
    WithdrawalReceipt,
};
use async_trait::async_trait;
use shared_types::{EthAddress, Instruction, Lamports, PoolId, Pubkey};

/// Primary settlement API.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Create the configuration singleton.
    async fn initialize(
        &self,
        admin: Pubkey,
        attesters: Vec<EthAddress>,
        threshold: u8,
        local_domain: u32,
    ) -> Result<GlobalConfig, SettlementError>;

    /// Create a pool (admin only).
    async fn create_pool(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        id: PoolId,
        name: String,
    ) -> Result<Pool, SettlementError>;

    /// Activate or deactivate a pool (admin only).
    async fn set_pool_active(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        pool_id: PoolId,
        active: bool,
    ) -> Result<Pool, SettlementError>;

    /// Donate from `donor`'s balance.
    async fn donate_to_pool(
        &self,
        donor: Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<DonationReceipt, SettlementError>;

    /// Create or overwrite an NGO record (admin only).
    async fn register_ngo(
        &self,
        config: &GlobalConfig,
        signer: Pubkey,
        wallet: Pubkey,
        allowed_pools: Vec<PoolId>,
        daily_limit: Lamports,
    ) -> Result<NgoRecord, SettlementError>;

    /// Withdraw as `ngo_wallet`, signed by `signer`.
    async fn withdraw_from_pool(
        &self,
        signer: Pubkey,
        ngo_wallet: Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<WithdrawalReceipt, SettlementError>;

    /// Credit an attested cross-chain burn.
    async fn credit_bridged_donation(
        &self,
        config: &GlobalConfig,
        pool_id: PoolId,
        message: Vec<u8>,
        attestation: Vec<u8>,
    ) -> Result<BridgedCreditReceipt, SettlementError>;

    /// Run a wire-format instruction.
    async fn execute(
        &self,
        instruction: &Instruction,
        signers: &[Pubkey],
    ) -> Result<ExecutionOutcome, SettlementError>;

    /// Stored configuration.
    async fn config(&self) -> Result<GlobalConfig, SettlementError>;

    /// A pool by id.
    async fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, SettlementError>;

    /// An NGO record by wallet.
    async fn get_ngo(&self, wallet: Pubkey) -> Result<Option<NgoRecord>, SettlementError>;

    /// Native balance held by a pool account.
    async fn pool_balance(&self, id: PoolId) -> Result<Lamports, SettlementError>;
}
