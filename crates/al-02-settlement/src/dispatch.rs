//! # Instruction Dispatcher
//!
//! Runs a wire-format [`Instruction`] against the engine: decodes the data,
//! maps account addresses back to natural keys, checks that every required
//! signer actually signed, then calls the typed operation.
//!
//! ## Account Order
//!
//! | Instruction | Accounts |
//! |-------------|----------|
//! | `initialize` | admin (s), config, system |
//! | `create_pool` | admin (s), config, pool, system |
//! | `donate_to_pool` | donor (s), pool, system |
//! | `register_ngo` | admin (s), config, ngo wallet, ngo, system |
//! | `withdraw_from_pool` | ngo wallet (s), ngo, pool, system, clock, rent |
//! | `set_pool_active` | admin (s), config, pool |
//! | `credit_bridged_donation` | relayer (s), config, pool, system |

use crate::codec::LedgerInstruction;
use crate::domain::{
    BridgedCreditReceipt, DonationReceipt, GlobalConfig, NgoRecord, Pool, SettlementError,
    WithdrawalReceipt,
};
use crate::engine::SettlementEngine;
use crate::ports::outbound::{ClockSource, LedgerStore, RecordKey};
use shared_types::{AccountMeta, Instruction, PoolId, Pubkey};

/// What a dispatched instruction committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Configuration created.
    Initialized(GlobalConfig),
    /// Pool created.
    PoolCreated(Pool),
    /// Pool activated or deactivated.
    PoolStatusChanged(Pool),
    /// Direct donation applied.
    Donated(DonationReceipt),
    /// NGO record written.
    NgoRegistered(NgoRecord),
    /// Withdrawal paid out.
    Withdrawn(WithdrawalReceipt),
    /// Bridged burn credited.
    BridgedCredited(BridgedCreditReceipt),
}

impl ExecutionOutcome {
    /// Instruction name that produced this outcome.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Initialized(_) => "initialize",
            Self::PoolCreated(_) => "create_pool",
            Self::PoolStatusChanged(_) => "set_pool_active",
            Self::Donated(_) => "donate_to_pool",
            Self::NgoRegistered(_) => "register_ngo",
            Self::Withdrawn(_) => "withdraw_from_pool",
            Self::BridgedCredited(_) => "credit_bridged_donation",
        }
    }
}

/// Positional account list with the transaction's verified signers.
struct Accounts<'a> {
    metas: &'a [AccountMeta],
    signers: &'a [Pubkey],
}

impl<'a> Accounts<'a> {
    fn meta(&self, index: usize, name: &str) -> Result<&'a AccountMeta, SettlementError> {
        self.metas
            .get(index)
            .ok_or_else(|| SettlementError::AccountMismatch {
                account: name.to_string(),
            })
    }

    fn key(&self, index: usize, name: &str) -> Result<Pubkey, SettlementError> {
        Ok(self.meta(index, name)?.pubkey)
    }

    fn signer(&self, index: usize, name: &str) -> Result<Pubkey, SettlementError> {
        let meta = self.meta(index, name)?;
        if !meta.is_signer || !self.signers.contains(&meta.pubkey) {
            return Err(SettlementError::UnauthorizedSigner {
                expected: meta.pubkey,
            });
        }
        Ok(meta.pubkey)
    }

    fn expect(&self, index: usize, name: &str, address: &Pubkey) -> Result<(), SettlementError> {
        if self.key(index, name)? != *address {
            return Err(SettlementError::AccountMismatch {
                account: name.to_string(),
            });
        }
        Ok(())
    }
}

impl<S: LedgerStore, C: ClockSource> SettlementEngine<S, C> {
    /// Execute one program instruction signed by `signers`.
    pub fn execute(
        &mut self,
        instruction: &Instruction,
        signers: &[Pubkey],
    ) -> Result<ExecutionOutcome, SettlementError> {
        if instruction.program_id != self.deriver.program_id() {
            return Err(SettlementError::InvalidInstruction(format!(
                "not addressed to this program: {}",
                instruction.program_id
            )));
        }
        let decoded = LedgerInstruction::decode(&instruction.data)
            .map_err(|e| SettlementError::InvalidInstruction(e.to_string()))?;
        let accounts = Accounts {
            metas: &instruction.accounts,
            signers,
        };

        match decoded {
            LedgerInstruction::Initialize {
                attesters,
                threshold,
                local_domain,
            } => {
                let admin = accounts.signer(0, "admin")?;
                accounts.expect(1, "config", &self.deriver.config()?.address)?;
                self.initialize(&admin, &attesters, threshold, local_domain)
                    .map(ExecutionOutcome::Initialized)
            }
            LedgerInstruction::CreatePool { id, name } => {
                let admin = accounts.signer(0, "admin")?;
                let config = self.config_at(&accounts)?;
                accounts.expect(2, "pool", &self.deriver.pool(id)?.address)?;
                self.create_pool(&config, &admin, id, &name)
                    .map(ExecutionOutcome::PoolCreated)
            }
            LedgerInstruction::DonateToPool { amount } => {
                let donor = accounts.signer(0, "donor")?;
                let pool_id = self.pool_at(&accounts.key(1, "pool")?)?;
                self.donate_to_pool(&donor, pool_id, amount)
                    .map(ExecutionOutcome::Donated)
            }
            LedgerInstruction::RegisterNgo {
                allowed_pools,
                daily_limit,
            } => {
                let admin = accounts.signer(0, "admin")?;
                let config = self.config_at(&accounts)?;
                let wallet = accounts.key(2, "ngo_wallet")?;
                accounts.expect(3, "ngo", &self.deriver.ngo(&wallet)?.address)?;
                self.register_ngo(&config, &admin, &wallet, &allowed_pools, daily_limit)
                    .map(ExecutionOutcome::NgoRegistered)
            }
            LedgerInstruction::WithdrawFromPool { amount } => {
                let wallet = accounts.signer(0, "ngo_wallet")?;
                accounts.expect(1, "ngo", &self.deriver.ngo(&wallet)?.address)?;
                let pool_address = accounts.key(2, "pool")?;
                let pool_id = match self.store.resolve(&pool_address)? {
                    Some(RecordKey::Pool(id)) => id,
                    _ => self.allowed_pool_at(&wallet, &pool_address)?,
                };
                self.withdraw_from_pool(&wallet, &wallet, pool_id, amount)
                    .map(ExecutionOutcome::Withdrawn)
            }
            LedgerInstruction::SetPoolActive { active } => {
                let admin = accounts.signer(0, "admin")?;
                let config = self.config_at(&accounts)?;
                let pool_id = self.pool_at(&accounts.key(2, "pool")?)?;
                self.set_pool_active(&config, &admin, pool_id, active)
                    .map(ExecutionOutcome::PoolStatusChanged)
            }
            LedgerInstruction::CreditBridgedDonation {
                message,
                attestation,
            } => {
                accounts.signer(0, "relayer")?;
                let config = self.config_at(&accounts)?;
                let pool_id = self.pool_at(&accounts.key(2, "pool")?)?;
                self.credit_bridged_donation(&config, pool_id, &message, &attestation)
                    .map(ExecutionOutcome::BridgedCredited)
            }
        }
    }

    /// Stored config, after checking slot 1 holds its address.
    fn config_at(&self, accounts: &Accounts<'_>) -> Result<GlobalConfig, SettlementError> {
        accounts.expect(1, "config", &self.deriver.config()?.address)?;
        self.config()
    }

    /// Pool stored at `address`. An empty address is reported as not
    /// initialized, one holding another record kind as a mismatch.
    fn pool_at(&self, address: &Pubkey) -> Result<PoolId, SettlementError> {
        match self.store.resolve(address)? {
            Some(RecordKey::Pool(id)) => Ok(id),
            Some(_) => Err(SettlementError::AccountMismatch {
                account: "pool".to_string(),
            }),
            None => Err(SettlementError::AccountNotInitialized {
                account: "pool".to_string(),
            }),
        }
    }

    /// Id of a not-yet-existing pool the NGO is allowed to draw from, so a
    /// withdrawal against it reports the pool as inactive.
    fn allowed_pool_at(&self, wallet: &Pubkey, address: &Pubkey) -> Result<PoolId, SettlementError> {
        let ngo = match self.store.get_ngo(wallet)? {
            Some(ngo) if ngo.is_active => ngo,
            _ => return Err(SettlementError::NgoInactive { wallet: *wallet }),
        };
        for id in &ngo.allowed_pools {
            if self.deriver.pool(*id)?.address == *address {
                return Ok(*id);
            }
        }
        Err(SettlementError::AccountNotInitialized {
            account: "pool".to_string(),
        })
    }
}
