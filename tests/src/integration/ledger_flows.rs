//! # Ledger Flows
//!
//! Pools, donations and NGO withdrawals against the settlement service,
//! with a manual clock for day boundaries.
//!
//! 1. **Donations accumulate**: two donations of 1000 into pool 0
//! 2. **Daily limit**: a full-limit withdrawal, then one unit more the same day
//! 3. **Day rollover**: the limit is available again the next day
//! 4. **Pool allow-list**: withdrawing from a pool outside the NGO's list

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use al_02_settlement::{
        GlobalConfig, InMemoryLedgerStore, ManualClock, SettlementApi, SettlementEngine,
        SettlementError, SettlementService, TransactionFeed,
    };
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent};
    use shared_crypto::AttesterKey;
    use shared_types::Pubkey;

    type Service = SettlementService<InMemoryLedgerStore, ManualClock, InMemoryEventBus>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ADMIN: Pubkey = Pubkey::new([1u8; 32]);
    const DONOR: Pubkey = Pubkey::new([2u8; 32]);
    const NGO: Pubkey = Pubkey::new([3u8; 32]);

    /// Noon UTC, so a day step never straddles midnight.
    const START: i64 = 1_700_000_000 - 1_700_000_000 % 86_400 + 43_200;

    struct Ledger {
        service: Service,
        config: GlobalConfig,
        clock: Arc<ManualClock>,
        bus: Arc<InMemoryEventBus>,
    }

    async fn ledger() -> Ledger {
        let clock = Arc::new(ManualClock::at(START));
        let bus = Arc::new(InMemoryEventBus::new());
        let service = SettlementService::new(
            SettlementEngine::new(InMemoryLedgerStore::new(), Arc::clone(&clock)),
            Arc::clone(&bus),
        );
        let attester = AttesterKey::from_bytes([5u8; 32]).unwrap();
        let config = service
            .initialize(ADMIN, vec![attester.address()], 1, 5)
            .await
            .unwrap();
        for (id, name) in [(0, "Ukraine"), (1, "Gaza")] {
            service
                .create_pool(&config, ADMIN, id, name.to_string())
                .await
                .unwrap();
        }
        service.deposit_native(DONOR, 10_000).await.unwrap();
        Ledger {
            service,
            config,
            clock,
            bus,
        }
    }

    /// 2000 donated into pool 0, NGO limited to 500/day on pool 0.
    async fn funded_ledger() -> Ledger {
        let l = ledger().await;
        l.service.donate_to_pool(DONOR, 0, 1000).await.unwrap();
        l.service.donate_to_pool(DONOR, 0, 1000).await.unwrap();
        l.service
            .register_ngo(&l.config, ADMIN, NGO, vec![0], 500)
            .await
            .unwrap();
        l
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_donations_accumulate() {
        let l = ledger().await;
        l.service.donate_to_pool(DONOR, 0, 1000).await.unwrap();
        let receipt = l.service.donate_to_pool(DONOR, 0, 1000).await.unwrap();
        assert_eq!(receipt.total_donated, 2000);

        let pool = l.service.get_pool(0).await.unwrap().unwrap();
        assert_eq!(pool.total_donated, 2000);
        assert_eq!(pool.total_withdrawn, 0);
        assert_eq!(l.service.pool_balance(0).await.unwrap(), 2000);
        assert_eq!(l.service.balance(DONOR).await.unwrap(), 8000);
    }

    #[tokio::test]
    async fn test_daily_limit_blocks_second_withdrawal() {
        let l = funded_ledger().await;

        let receipt = l.service.withdraw_from_pool(NGO, NGO, 0, 500).await.unwrap();
        assert_eq!(receipt.withdrawn_today, 500);
        assert_eq!(receipt.remaining_today, 0);

        let err = l.service.withdraw_from_pool(NGO, NGO, 0, 1).await.unwrap_err();
        assert!(matches!(err, SettlementError::DailyLimitExceeded { .. }));

        let ngo = l.service.get_ngo(NGO).await.unwrap().unwrap();
        assert_eq!(ngo.withdrawn_today, 500);
        assert_eq!(l.service.pool_balance(0).await.unwrap(), 1500);
        assert_eq!(l.service.balance(NGO).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_limit_resets_next_day() {
        let l = funded_ledger().await;
        l.service.withdraw_from_pool(NGO, NGO, 0, 500).await.unwrap();

        l.clock.advance_days(1);
        let receipt = l.service.withdraw_from_pool(NGO, NGO, 0, 500).await.unwrap();
        assert_eq!(receipt.withdrawn_today, 500);

        let pool = l.service.get_pool(0).await.unwrap().unwrap();
        assert_eq!(pool.total_withdrawn, 1000);
        assert_eq!(pool.total_donated, 2000);
        assert_eq!(l.service.pool_balance(0).await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_pool_outside_allow_list_rejected() {
        let l = funded_ledger().await;
        l.service.donate_to_pool(DONOR, 1, 100).await.unwrap();

        let err = l.service.withdraw_from_pool(NGO, NGO, 1, 10).await.unwrap_err();
        assert!(matches!(err, SettlementError::NgoNotAllowedForPool { .. }));
        assert_eq!(l.service.pool_balance(1).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_rejected_withdrawal_leaves_state_unchanged() {
        let l = funded_ledger().await;
        let before = l.service.get_ngo(NGO).await.unwrap().unwrap();

        let err = l
            .service
            .withdraw_from_pool(NGO, NGO, 0, 501)
            .await
            .unwrap_err();
        assert!(matches!(err, SettlementError::DailyLimitExceeded { .. }));
        assert_eq!(l.service.get_ngo(NGO).await.unwrap().unwrap(), before);
        assert_eq!(l.service.pool_balance(0).await.unwrap(), 2000);
    }

    #[tokio::test]
    async fn test_money_movements_reach_the_feed() {
        let l = ledger().await;
        let feed = TransactionFeed::default();
        let mut sub = l
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Donations]));

        l.service.donate_to_pool(DONOR, 1, 250).await.unwrap();

        let event = timeout(Duration::from_millis(200), sub.recv())
            .await
            .expect("timeout waiting for event")
            .expect("should receive event");
        assert!(matches!(event, LedgerEvent::DonationReceived { amount: 250, .. }));
        assert!(feed.apply(&event));
        assert_eq!(feed.for_pool(1, 10).len(), 1);
    }
}
