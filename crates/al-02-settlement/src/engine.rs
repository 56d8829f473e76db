//! # Settlement Engine
//!
//! The relief-pool ledger state machine. Every operation validates fully
//! against the current records, builds one [`WriteBatch`] and commits it;
//! a rejected operation leaves the store untouched.
//!
//! Methods take `&mut self`: the host serializes writes, so the engine does
//! no locking of its own.

use crate::algorithms::{apply_withdrawal, rollover, verify_attestation};
use crate::codec::{encode_account, CctpMessage};
use crate::domain::{
    dedup_pool_ids, validate_pool_name, BridgedCreditReceipt, DonationReceipt, GlobalConfig,
    NgoRecord, Pool, SettlementError, WithdrawalReceipt, MAX_ALLOWED_POOLS, MAX_ATTESTERS,
};
use crate::ports::outbound::{ClockSource, LedgerStore, RecordKey, WriteBatch};
use al_01_address_derivation::AddressDeriver;
use shared_types::{day_index, EthAddress, Lamports, PoolId, Pubkey, SYSTEM_PROGRAM_ID};
use std::sync::Arc;
use tracing::debug;

/// Raw view of one ledger account, as the chain would serve it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account address.
    pub address: Pubkey,
    /// Tagged record bytes; empty for plain wallets.
    pub data: Vec<u8>,
    /// Native balance.
    pub lamports: Lamports,
    /// Program owning the account.
    pub owner: Pubkey,
}

/// Relief-pool ledger over a record store and a clock.
pub struct SettlementEngine<S: LedgerStore, C: ClockSource> {
    pub(crate) store: S,
    pub(crate) clock: Arc<C>,
    pub(crate) deriver: AddressDeriver,
}

impl<S: LedgerStore, C: ClockSource> SettlementEngine<S, C> {
    /// Engine bound to the default program id.
    pub fn new(store: S, clock: Arc<C>) -> Self {
        Self::with_deriver(store, clock, AddressDeriver::default())
    }

    /// Engine bound to the program id of `deriver`.
    pub fn with_deriver(store: S, clock: Arc<C>, deriver: AddressDeriver) -> Self {
        Self {
            store,
            clock,
            deriver,
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ledger clock.
    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Address deriver for this program.
    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    // =========================================================================
    // NATIVE BALANCES
    // =========================================================================

    /// Credit native balance to an address (faucet / airdrop).
    pub fn deposit_native(
        &mut self,
        address: &Pubkey,
        amount: Lamports,
    ) -> Result<Lamports, SettlementError> {
        let balance = self
            .store
            .balance(address)?
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        self.store
            .commit(WriteBatch::new().set_balance(*address, balance))?;
        Ok(balance)
    }

    // =========================================================================
    // ADMIN OPERATIONS
    // =========================================================================

    /// Create the configuration singleton.
    ///
    /// Repeated attester addresses are collapsed; the threshold must lie in
    /// `1..=attesters`.
    pub fn initialize(
        &mut self,
        admin: &Pubkey,
        attesters: &[EthAddress],
        threshold: u8,
        local_domain: u32,
    ) -> Result<GlobalConfig, SettlementError> {
        if self.store.get_config()?.is_some() {
            return Err(SettlementError::AlreadyInitialized);
        }

        let mut unique: Vec<EthAddress> = Vec::with_capacity(attesters.len());
        for attester in attesters {
            if !unique.contains(attester) {
                unique.push(*attester);
            }
        }
        if unique.len() > MAX_ATTESTERS || threshold == 0 || usize::from(threshold) > unique.len()
        {
            return Err(SettlementError::InvalidAttestationPolicy {
                threshold,
                attesters: unique.len(),
            });
        }

        let derived = self.deriver.config()?;
        let config = GlobalConfig {
            admin: *admin,
            attesters: unique,
            attestation_threshold: threshold,
            local_domain,
            bump: derived.bump,
        };
        self.store
            .commit(WriteBatch::new().put_config(derived.address, config.clone()))?;

        debug!(admin = %admin, threshold, local_domain, "[al-02] config committed");
        Ok(config)
    }

    /// Create an empty, active pool.
    pub fn create_pool(
        &mut self,
        config: &GlobalConfig,
        signer: &Pubkey,
        id: PoolId,
        name: &str,
    ) -> Result<Pool, SettlementError> {
        self.authorize_admin(config, signer)?;
        validate_pool_name(name)?;
        if self.store.get_pool(id)?.is_some() {
            return Err(SettlementError::DuplicatePool { pool_id: id });
        }

        let derived = self.deriver.pool(id)?;
        let pool = Pool::new(id, name, derived.bump);
        self.store
            .commit(WriteBatch::new().put_pool(derived.address, pool.clone()))?;

        debug!(pool_id = id, address = %derived.address, "[al-02] pool committed");
        Ok(pool)
    }

    /// Activate or deactivate a pool.
    pub fn set_pool_active(
        &mut self,
        config: &GlobalConfig,
        signer: &Pubkey,
        pool_id: PoolId,
        active: bool,
    ) -> Result<Pool, SettlementError> {
        self.authorize_admin(config, signer)?;
        let mut pool = self
            .store
            .get_pool(pool_id)?
            .ok_or(SettlementError::PoolNotFound { pool_id })?;
        pool.is_active = active;

        let address = self.deriver.pool(pool_id)?.address;
        self.store
            .commit(WriteBatch::new().put_pool(address, pool.clone()))?;
        Ok(pool)
    }

    /// Create or overwrite an NGO record.
    ///
    /// Overwriting resets the daily counter and reactivates the NGO.
    pub fn register_ngo(
        &mut self,
        config: &GlobalConfig,
        signer: &Pubkey,
        wallet: &Pubkey,
        allowed_pools: &[PoolId],
        daily_limit: Lamports,
    ) -> Result<NgoRecord, SettlementError> {
        self.authorize_admin(config, signer)?;
        if allowed_pools.len() > MAX_ALLOWED_POOLS {
            return Err(SettlementError::TooManyAllowedPools {
                count: allowed_pools.len(),
                max: MAX_ALLOWED_POOLS,
            });
        }

        let derived = self.deriver.ngo(wallet)?;
        let ngo = NgoRecord {
            wallet: *wallet,
            is_active: true,
            allowed_pools: dedup_pool_ids(allowed_pools),
            daily_limit,
            withdrawn_today: 0,
            last_withdraw_day: self.clock.current_day(),
            bump: derived.bump,
        };
        self.store
            .commit(WriteBatch::new().put_ngo(derived.address, ngo.clone()))?;

        debug!(wallet = %wallet, daily_limit, "[al-02] ngo committed");
        Ok(ngo)
    }

    // =========================================================================
    // FUND MOVEMENT
    // =========================================================================

    /// Move `amount` from the donor's balance into a pool.
    pub fn donate_to_pool(
        &mut self,
        donor: &Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<DonationReceipt, SettlementError> {
        let mut pool = self
            .store
            .get_pool(pool_id)?
            .ok_or(SettlementError::PoolNotFound { pool_id })?;
        if !pool.is_active {
            return Err(SettlementError::PoolInactive { pool_id });
        }
        if amount == 0 {
            return Err(SettlementError::InvalidAmount);
        }

        let pool_address = self.deriver.pool(pool_id)?.address;
        if *donor == pool_address {
            return Err(SettlementError::AccountMismatch {
                account: "donor".to_string(),
            });
        }

        let donor_balance = self.store.balance(donor)?;
        if donor_balance < amount {
            return Err(SettlementError::InsufficientFunds {
                requested: amount,
                available: donor_balance,
            });
        }
        let pool_balance = self
            .store
            .balance(&pool_address)?
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        pool.total_donated = pool
            .total_donated
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;

        let timestamp = self.clock.unix_timestamp();
        let total_donated = pool.total_donated;
        self.store.commit(
            WriteBatch::new()
                .put_pool(pool_address, pool)
                .set_balance(*donor, donor_balance - amount)
                .set_balance(pool_address, pool_balance),
        )?;

        Ok(DonationReceipt {
            pool_id,
            donor: *donor,
            amount,
            timestamp,
            total_donated,
        })
    }

    /// Pay `amount` out of a pool to the NGO that signed for it.
    ///
    /// Check order: signer, NGO active, allow-list, pool active, amount,
    /// daily limit (after rollover), pool balance.
    pub fn withdraw_from_pool(
        &mut self,
        signer: &Pubkey,
        ngo_wallet: &Pubkey,
        pool_id: PoolId,
        amount: Lamports,
    ) -> Result<WithdrawalReceipt, SettlementError> {
        if signer != ngo_wallet {
            return Err(SettlementError::UnauthorizedSigner {
                expected: *ngo_wallet,
            });
        }
        let mut ngo = match self.store.get_ngo(ngo_wallet)? {
            Some(ngo) if ngo.is_active => ngo,
            _ => {
                return Err(SettlementError::NgoInactive {
                    wallet: *ngo_wallet,
                })
            }
        };
        if !ngo.is_allowed(pool_id) {
            return Err(SettlementError::NgoNotAllowedForPool {
                wallet: *ngo_wallet,
                pool_id,
            });
        }
        let mut pool = match self.store.get_pool(pool_id)? {
            Some(pool) if pool.is_active => pool,
            _ => return Err(SettlementError::PoolInactive { pool_id }),
        };
        if amount == 0 {
            return Err(SettlementError::InvalidAmount);
        }

        let timestamp = self.clock.unix_timestamp();
        let today = day_index(timestamp);
        rollover(&mut ngo, today);
        let withdrawn_today = apply_withdrawal(&ngo, amount)?;

        let pool_address = self.deriver.pool(pool_id)?.address;
        let pool_balance = self.store.balance(&pool_address)?;
        let available = pool_balance.min(pool.outstanding());
        if amount > available {
            return Err(SettlementError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        let wallet_balance = self
            .store
            .balance(ngo_wallet)?
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        pool.total_withdrawn = pool
            .total_withdrawn
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        ngo.withdrawn_today = withdrawn_today;

        let receipt = WithdrawalReceipt {
            pool_id,
            ngo_wallet: *ngo_wallet,
            amount,
            timestamp,
            day: today,
            withdrawn_today,
            remaining_today: ngo.daily_limit - withdrawn_today,
            total_withdrawn: pool.total_withdrawn,
        };

        let ngo_address = self.deriver.ngo(ngo_wallet)?.address;
        self.store.commit(
            WriteBatch::new()
                .put_pool(pool_address, pool)
                .put_ngo(ngo_address, ngo)
                .set_balance(pool_address, pool_balance - amount)
                .set_balance(*ngo_wallet, wallet_balance),
        )?;
        Ok(receipt)
    }

    /// Credit an attested cross-chain burn to a pool.
    ///
    /// Anyone may relay; the attestation is the authorization. Each burn
    /// message is credited at most once.
    pub fn credit_bridged_donation(
        &mut self,
        config: &GlobalConfig,
        pool_id: PoolId,
        message: &[u8],
        attestation: &[u8],
    ) -> Result<BridgedCreditReceipt, SettlementError> {
        self.check_config(config)?;

        let decoded = CctpMessage::decode(message)
            .map_err(|e| SettlementError::InvalidBridgeMessage(e.to_string()))?;
        if decoded.destination_domain != config.local_domain {
            return Err(SettlementError::WrongDestinationDomain {
                expected: config.local_domain,
                got: decoded.destination_domain,
            });
        }

        let message_hash = CctpMessage::hash_of(message);
        verify_attestation(config, &message_hash, attestation)?;
        if self.store.is_consumed(&message_hash)? {
            return Err(SettlementError::AttestationAlreadyConsumed);
        }

        let pool_address = self.deriver.pool(pool_id)?.address;
        if decoded.body.mint_recipient != pool_address.to_bytes() {
            return Err(SettlementError::MintRecipientMismatch { pool_id });
        }
        let mut pool = self
            .store
            .get_pool(pool_id)?
            .ok_or(SettlementError::PoolNotFound { pool_id })?;
        if !pool.is_active {
            return Err(SettlementError::PoolInactive { pool_id });
        }
        let amount = decoded.body.amount;
        if amount == 0 {
            return Err(SettlementError::InvalidAmount);
        }

        let pool_balance = self
            .store
            .balance(&pool_address)?
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        pool.total_donated = pool
            .total_donated
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;

        let receipt = BridgedCreditReceipt {
            pool_id,
            amount,
            message_hash,
            nonce: decoded.nonce,
            source_domain: decoded.source_domain,
            timestamp: self.clock.unix_timestamp(),
            total_donated: pool.total_donated,
        };
        self.store.commit(
            WriteBatch::new()
                .put_pool(pool_address, pool)
                .set_balance(pool_address, pool_balance)
                .consume(message_hash),
        )?;
        Ok(receipt)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Stored configuration.
    pub fn config(&self) -> Result<GlobalConfig, SettlementError> {
        self.store
            .get_config()?
            .ok_or(SettlementError::NotInitialized)
    }

    /// A pool by id.
    pub fn get_pool(&self, id: PoolId) -> Result<Option<Pool>, SettlementError> {
        self.store.get_pool(id)
    }

    /// An NGO record by wallet.
    pub fn get_ngo(&self, wallet: &Pubkey) -> Result<Option<NgoRecord>, SettlementError> {
        self.store.get_ngo(wallet)
    }

    /// Native balance of any address.
    pub fn balance(&self, address: &Pubkey) -> Result<Lamports, SettlementError> {
        self.store.balance(address)
    }

    /// Native balance held by a pool account.
    pub fn pool_balance(&self, pool_id: PoolId) -> Result<Lamports, SettlementError> {
        let address = self.deriver.pool(pool_id)?.address;
        self.store.balance(&address)
    }

    /// What an NGO may still withdraw today, `None` if unregistered.
    pub fn remaining_allowance(&self, wallet: &Pubkey) -> Result<Option<Lamports>, SettlementError> {
        let today = self.clock.current_day();
        Ok(self
            .store
            .get_ngo(wallet)?
            .map(|ngo| ngo.remaining_on(today)))
    }

    /// Account bytes and balance at `address`, or `None` if it holds
    /// neither a record nor a balance.
    pub fn account(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>, SettlementError> {
        let lamports = self.store.balance(address)?;
        let program = self.deriver.program_id();

        let data = match self.store.resolve(address)? {
            Some(RecordKey::Config) => self.store.get_config()?.map(|c| encode_account(&c)),
            Some(RecordKey::Pool(id)) => self.store.get_pool(id)?.map(|p| encode_account(&p)),
            Some(RecordKey::Ngo(wallet)) => {
                self.store.get_ngo(&wallet)?.map(|n| encode_account(&n))
            }
            None => None,
        };

        match data {
            Some(encoded) => Ok(Some(AccountSnapshot {
                address: *address,
                data: encoded.map_err(|e| SettlementError::Storage(e.to_string()))?,
                lamports,
                owner: program,
            })),
            None if lamports > 0 => Ok(Some(AccountSnapshot {
                address: *address,
                data: Vec::new(),
                lamports,
                owner: SYSTEM_PROGRAM_ID,
            })),
            None => Ok(None),
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// The passed configuration must be the stored one.
    fn check_config(&self, config: &GlobalConfig) -> Result<(), SettlementError> {
        if self.config()? != *config {
            return Err(SettlementError::AccountMismatch {
                account: "config".to_string(),
            });
        }
        Ok(())
    }

    fn authorize_admin(
        &self,
        config: &GlobalConfig,
        signer: &Pubkey,
    ) -> Result<(), SettlementError> {
        self.check_config(config)?;
        if !config.is_admin(signer) {
            return Err(SettlementError::UnauthorizedAdmin { signer: *signer });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryLedgerStore, ManualClock};
    use crate::codec::{decode_account, BurnMessage};
    use crate::domain::{invariant_daily_limit, invariant_pool_conservation};
    use shared_crypto::AttesterKey;
    use shared_types::SECONDS_PER_DAY;

    const DAY_0: i64 = 19_700 * SECONDS_PER_DAY + 3_600;

    struct Fixture {
        engine: SettlementEngine<InMemoryLedgerStore, ManualClock>,
        config: GlobalConfig,
        admin: Pubkey,
        attester: AttesterKey,
    }

    fn setup() -> Fixture {
        let clock = Arc::new(ManualClock::at(DAY_0));
        let mut engine = SettlementEngine::new(InMemoryLedgerStore::new(), clock);
        let admin = Pubkey::new([1u8; 32]);
        let attester = AttesterKey::from_bytes([21u8; 32]).unwrap();
        let config = engine
            .initialize(&admin, &[attester.address()], 1, 5)
            .unwrap();
        Fixture {
            engine,
            config,
            admin,
            attester,
        }
    }

    fn donor(f: &mut Fixture, funds: Lamports) -> Pubkey {
        let donor = Pubkey::new([50u8; 32]);
        f.engine.deposit_native(&donor, funds).unwrap();
        donor
    }

    fn funded_pool(f: &mut Fixture, id: PoolId, amount: Lamports) {
        f.engine
            .create_pool(&f.config, &f.admin, id, "Ukraine")
            .unwrap();
        let d = donor(f, amount);
        f.engine.donate_to_pool(&d, id, amount).unwrap();
    }

    fn burn_message(f: &Fixture, pool_id: PoolId, amount: Lamports, nonce: u64) -> Vec<u8> {
        CctpMessage {
            version: 0,
            source_domain: 0,
            destination_domain: 5,
            nonce,
            sender: [9u8; 32],
            recipient: [8u8; 32],
            destination_caller: [0u8; 32],
            body: BurnMessage {
                version: 0,
                burn_token: [7u8; 32],
                mint_recipient: f.engine.deriver().pool(pool_id).unwrap().address.to_bytes(),
                amount,
                message_sender: [6u8; 32],
            },
        }
        .encode()
    }

    #[test]
    fn test_initialize_once() {
        let mut f = setup();
        assert_eq!(
            f.engine.initialize(&f.admin, &[f.attester.address()], 1, 5),
            Err(SettlementError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_initialize_rejects_bad_threshold() {
        let clock = Arc::new(ManualClock::at(DAY_0));
        let mut engine = SettlementEngine::new(InMemoryLedgerStore::new(), clock);
        let a = EthAddress([1u8; 20]);
        assert_eq!(
            engine.initialize(&Pubkey::default(), &[a, a], 2, 5),
            Err(SettlementError::InvalidAttestationPolicy {
                threshold: 2,
                attesters: 1
            })
        );
        assert!(engine.initialize(&Pubkey::default(), &[a], 0, 5).is_err());
    }

    #[test]
    fn test_two_donations_accumulate() {
        let mut f = setup();
        f.engine
            .create_pool(&f.config, &f.admin, 0, "Ukraine")
            .unwrap();
        let d = donor(&mut f, 5_000);
        f.engine.donate_to_pool(&d, 0, 1000).unwrap();
        let receipt = f.engine.donate_to_pool(&d, 0, 1000).unwrap();

        assert_eq!(receipt.total_donated, 2000);
        let pool = f.engine.get_pool(0).unwrap().unwrap();
        assert_eq!(pool.total_donated, 2000);
        assert_eq!(pool.total_withdrawn, 0);
        assert_eq!(f.engine.pool_balance(0).unwrap(), 2000);
        assert_eq!(f.engine.balance(&d).unwrap(), 3000);
    }

    #[test]
    fn test_create_pool_requires_admin() {
        let mut f = setup();
        let intruder = Pubkey::new([66u8; 32]);
        assert_eq!(
            f.engine.create_pool(&f.config, &intruder, 0, "x"),
            Err(SettlementError::UnauthorizedAdmin { signer: intruder })
        );
    }

    #[test]
    fn test_forged_config_rejected() {
        let mut f = setup();
        let intruder = Pubkey::new([66u8; 32]);
        let mut forged = f.config.clone();
        forged.admin = intruder;
        assert!(matches!(
            f.engine.create_pool(&forged, &intruder, 0, "x"),
            Err(SettlementError::AccountMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_pool_and_long_name() {
        let mut f = setup();
        f.engine.create_pool(&f.config, &f.admin, 0, "a").unwrap();
        assert_eq!(
            f.engine.create_pool(&f.config, &f.admin, 0, "b"),
            Err(SettlementError::DuplicatePool { pool_id: 0 })
        );
        assert!(matches!(
            f.engine
                .create_pool(&f.config, &f.admin, 1, &"n".repeat(65)),
            Err(SettlementError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_donation_check_order() {
        let mut f = setup();
        let d = donor(&mut f, 10);
        assert_eq!(
            f.engine.donate_to_pool(&d, 9, 0),
            Err(SettlementError::PoolNotFound { pool_id: 9 })
        );

        f.engine.create_pool(&f.config, &f.admin, 0, "a").unwrap();
        assert_eq!(
            f.engine.donate_to_pool(&d, 0, 0),
            Err(SettlementError::InvalidAmount)
        );
        assert_eq!(
            f.engine.donate_to_pool(&d, 0, 11),
            Err(SettlementError::InsufficientFunds {
                requested: 11,
                available: 10
            })
        );

        f.engine
            .set_pool_active(&f.config, &f.admin, 0, false)
            .unwrap();
        assert_eq!(
            f.engine.donate_to_pool(&d, 0, 0),
            Err(SettlementError::PoolInactive { pool_id: 0 })
        );
    }

    #[test]
    fn test_daily_limit_resets_next_day() {
        let mut f = setup();
        funded_pool(&mut f, 0, 5_000);
        let w = Pubkey::new([30u8; 32]);
        f.engine
            .register_ngo(&f.config, &f.admin, &w, &[0], 500)
            .unwrap();

        let receipt = f.engine.withdraw_from_pool(&w, &w, 0, 500).unwrap();
        assert_eq!(receipt.withdrawn_today, 500);
        assert_eq!(receipt.remaining_today, 0);
        assert!(matches!(
            f.engine.withdraw_from_pool(&w, &w, 0, 1),
            Err(SettlementError::DailyLimitExceeded { .. })
        ));

        f.engine.clock().advance_days(1);
        let next = f.engine.withdraw_from_pool(&w, &w, 0, 500).unwrap();
        assert_eq!(next.withdrawn_today, 500);
        assert_eq!(next.day, receipt.day + 1);

        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 1, 10),
            Err(SettlementError::NgoNotAllowedForPool {
                wallet: w,
                pool_id: 1
            })
        );

        let pool = f.engine.get_pool(0).unwrap().unwrap();
        assert_eq!(pool.total_withdrawn, 1000);
        assert!(invariant_pool_conservation(&pool));
        assert_eq!(f.engine.balance(&w).unwrap(), 1000);
        assert_eq!(f.engine.pool_balance(0).unwrap(), 4000);
    }

    #[test]
    fn test_insufficient_funds_is_atomic() {
        let mut f = setup();
        funded_pool(&mut f, 0, 100);
        let w = Pubkey::new([30u8; 32]);
        f.engine
            .register_ngo(&f.config, &f.admin, &w, &[0], 500)
            .unwrap();

        // Yesterday's spend must survive a failed first withdrawal of today.
        f.engine.withdraw_from_pool(&w, &w, 0, 60).unwrap();
        f.engine.clock().advance_days(1);

        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 0, 41),
            Err(SettlementError::InsufficientFunds {
                requested: 41,
                available: 40
            })
        );
        let ngo = f.engine.get_ngo(&w).unwrap().unwrap();
        assert_eq!(ngo.withdrawn_today, 60);
        assert_eq!(ngo.last_withdraw_day, day_index(DAY_0));
        assert_eq!(f.engine.get_pool(0).unwrap().unwrap().total_withdrawn, 60);
        assert!(invariant_daily_limit(&ngo));
    }

    #[test]
    fn test_withdraw_authorization_order() {
        let mut f = setup();
        funded_pool(&mut f, 0, 100);
        let w = Pubkey::new([30u8; 32]);
        let other = Pubkey::new([31u8; 32]);

        assert_eq!(
            f.engine.withdraw_from_pool(&other, &w, 0, 1),
            Err(SettlementError::UnauthorizedSigner { expected: w })
        );
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 0, 1),
            Err(SettlementError::NgoInactive { wallet: w })
        );

        f.engine
            .register_ngo(&f.config, &f.admin, &w, &[0, 3], 500)
            .unwrap();
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 3, 1),
            Err(SettlementError::PoolInactive { pool_id: 3 })
        );
        f.engine
            .set_pool_active(&f.config, &f.admin, 0, false)
            .unwrap();
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 0, 1),
            Err(SettlementError::PoolInactive { pool_id: 0 })
        );
    }

    #[test]
    fn test_zero_withdrawal_outside_allow_list() {
        let mut f = setup();
        funded_pool(&mut f, 0, 100);
        let w = Pubkey::new([30u8; 32]);
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 0, 0),
            Err(SettlementError::NgoInactive { wallet: w })
        );

        f.engine
            .register_ngo(&f.config, &f.admin, &w, &[0], 500)
            .unwrap();
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 1, 0),
            Err(SettlementError::NgoNotAllowedForPool {
                wallet: w,
                pool_id: 1
            })
        );
        assert_eq!(
            f.engine.withdraw_from_pool(&w, &w, 0, 0),
            Err(SettlementError::InvalidAmount)
        );
    }

    #[test]
    fn test_register_ngo_limits_and_dedup() {
        let mut f = setup();
        let w = Pubkey::new([30u8; 32]);
        let too_many: Vec<PoolId> = (0..17).collect();
        assert_eq!(
            f.engine
                .register_ngo(&f.config, &f.admin, &w, &too_many, 1),
            Err(SettlementError::TooManyAllowedPools { count: 17, max: 16 })
        );

        let ngo = f
            .engine
            .register_ngo(&f.config, &f.admin, &w, &[2, 2, 0], 9)
            .unwrap();
        assert_eq!(ngo.allowed_pools, vec![2, 0]);
        assert_eq!(ngo.last_withdraw_day, day_index(DAY_0));
        assert_eq!(f.engine.remaining_allowance(&w).unwrap(), Some(9));
    }

    #[test]
    fn test_bridged_credit_exactly_once() {
        let mut f = setup();
        f.engine.create_pool(&f.config, &f.admin, 0, "a").unwrap();
        let message = burn_message(&f, 0, 100, 1);
        let sig = f
            .attester
            .sign_prehash(&CctpMessage::hash_of(&message))
            .unwrap();

        let receipt = f
            .engine
            .credit_bridged_donation(&f.config, 0, &message, &sig)
            .unwrap();
        assert_eq!(receipt.amount, 100);
        assert_eq!(receipt.total_donated, 100);
        assert_eq!(f.engine.pool_balance(0).unwrap(), 100);

        assert_eq!(
            f.engine
                .credit_bridged_donation(&f.config, 0, &message, &sig),
            Err(SettlementError::AttestationAlreadyConsumed)
        );
        assert_eq!(f.engine.get_pool(0).unwrap().unwrap().total_donated, 100);
    }

    #[test]
    fn test_bridged_credit_rejections() {
        let mut f = setup();
        f.engine.create_pool(&f.config, &f.admin, 0, "a").unwrap();
        f.engine.create_pool(&f.config, &f.admin, 1, "b").unwrap();
        let message = burn_message(&f, 0, 100, 1);
        let hash = CctpMessage::hash_of(&message);

        let outsider = AttesterKey::from_bytes([99u8; 32]).unwrap();
        let bad_sig = outsider.sign_prehash(&hash).unwrap();
        assert_eq!(
            f.engine
                .credit_bridged_donation(&f.config, 0, &message, &bad_sig),
            Err(SettlementError::InvalidAttestation {
                valid: 0,
                required: 1
            })
        );

        let sig = f.attester.sign_prehash(&hash).unwrap();
        assert_eq!(
            f.engine
                .credit_bridged_donation(&f.config, 1, &message, &sig),
            Err(SettlementError::MintRecipientMismatch { pool_id: 1 })
        );

        let mut wrong_domain = CctpMessage::decode(&message).unwrap();
        wrong_domain.destination_domain = 7;
        let raw = wrong_domain.encode();
        assert_eq!(
            f.engine.credit_bridged_donation(&f.config, 0, &raw, &sig),
            Err(SettlementError::WrongDestinationDomain {
                expected: 5,
                got: 7
            })
        );

        assert!(matches!(
            f.engine
                .credit_bridged_donation(&f.config, 0, &message[..10], &sig),
            Err(SettlementError::InvalidBridgeMessage(_))
        ));
    }

    #[test]
    fn test_account_snapshot_decodes() {
        let mut f = setup();
        funded_pool(&mut f, 4, 250);
        let address = f.engine.deriver().pool(4).unwrap().address;

        let snapshot = f.engine.account(&address).unwrap().unwrap();
        assert_eq!(snapshot.lamports, 250);
        assert_eq!(snapshot.owner, f.engine.deriver().program_id());
        let pool: Pool = decode_account(&snapshot.data).unwrap();
        assert_eq!(pool.total_donated, 250);

        assert!(f.engine.account(&Pubkey::new([77u8; 32])).unwrap().is_none());
    }
}
