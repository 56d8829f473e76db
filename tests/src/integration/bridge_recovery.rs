//! # Bridge Recovery
//!
//! The burn → attest → credit flow against the local runtime: a simulated
//! attestation outage parks the session as stuck, a later resume credits
//! the pool exactly once, and persisted sessions survive a restart.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use aid_runtime::{AidContainer, AidRuntime, RuntimeConfig};
    use al_02_settlement::SettlementApi;
    use al_04_cross_chain_bridge::{
        BridgeApi, BridgeOrchestrator, BridgePolicy, BridgeRequest, BridgeState, DonationRelay,
        JsonFileSessionStore, RelayOutcome, SettlementRelay,
    };
    use shared_bus::InMemoryEventBus;
    use shared_types::EthAddress;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const MAX_ATTEMPTS: u32 = 3;

    fn config(dir: &tempfile::TempDir) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.bridge.session_dir = dir.path().to_path_buf();
        config.bridge.poll_interval = Duration::from_millis(1);
        config.bridge.max_attempts = MAX_ATTEMPTS;
        config
    }

    fn request(amount: u64, pool: u64) -> BridgeRequest {
        BridgeRequest {
            owner: EthAddress([0x11; 20]),
            amount,
            destination_pool: pool,
        }
    }

    async fn total_donated(container: &AidContainer, pool: u64) -> u64 {
        let chains = container.local_chains().unwrap();
        chains
            .host
            .service()
            .get_pool(pool)
            .await
            .unwrap()
            .unwrap()
            .total_donated
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_happy_path_credits_pool() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();

        let session = container
            .bridge()
            .execute_bridge(request(2_500_000, 1))
            .await
            .unwrap();
        assert_eq!(session.state, BridgeState::Relayed);
        assert_eq!(total_donated(&container, 1).await, 2_500_000);

        let pools = container.pools().await.unwrap();
        assert_eq!(pools[1].balance, 2_500_000);
    }

    #[tokio::test]
    async fn test_stuck_attestation_credits_once_after_resume() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();
        let chains = container.local_chains().unwrap();
        let bridge = container.bridge();

        chains.attestations.set_outage(true);
        let session = bridge.execute_bridge(request(100, 0)).await.unwrap();
        assert_eq!(session.state, BridgeState::Stuck);
        assert!(session.burn_tx.is_some());
        assert_eq!(total_donated(&container, 0).await, 0);
        assert_eq!(chains.source.burn_count(), 1);

        let burn_id = session.burn_id.unwrap();
        chains.attestations.set_outage(false);
        let resumed = bridge.resume(burn_id).await.unwrap();
        assert_eq!(resumed.id, session.id);
        assert_eq!(resumed.state, BridgeState::Relayed);
        assert_eq!(total_donated(&container, 0).await, 100);

        // Resuming a relayed session is a no-op.
        let again = bridge.resume(burn_id).await.unwrap();
        assert_eq!(again.state, BridgeState::Relayed);
        assert_eq!(total_donated(&container, 0).await, 100);

        // Relaying the same message and attestation reports the earlier credit.
        let relay = SettlementRelay::new(chains.host.service().clone());
        let outcome = relay
            .relay(
                0,
                resumed.message.as_deref().unwrap(),
                resumed.attestation.as_deref().unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::AlreadyCredited);
        assert_eq!(total_donated(&container, 0).await, 100);

        // No second burn was sent.
        assert_eq!(chains.source.burn_count(), 1);
    }

    #[tokio::test]
    async fn test_persisted_session_resumed_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let container = AidContainer::local(config.clone()).await.unwrap();
        let chains = container.local_chains().unwrap();

        chains.attestations.set_outage(true);
        let stuck = container
            .bridge()
            .execute_bridge(request(750, 2))
            .await
            .unwrap();
        assert_eq!(stuck.state, BridgeState::Stuck);
        chains.attestations.set_outage(false);

        // A fresh orchestrator over the same session directory.
        let restarted = BridgeOrchestrator::new(
            container.builder(),
            chains.source.clone(),
            chains.attestations.clone(),
            Arc::new(SettlementRelay::new(chains.host.service().clone())),
            Arc::new(JsonFileSessionStore::open(dir.path()).unwrap()),
            Arc::new(InMemoryEventBus::new()),
        )
        .with_policy(BridgePolicy {
            poll_interval: Duration::from_millis(1),
            max_attempts: MAX_ATTEMPTS,
        });

        let reloaded = restarted.get_session(stuck.id).await.unwrap().unwrap();
        assert_eq!(reloaded.state, BridgeState::Stuck);
        assert_eq!(reloaded.burn_id, stuck.burn_id);

        let resumed = restarted.resume_stuck().await.unwrap();
        assert_eq!(resumed.len(), 1);
        assert_eq!(resumed[0].state, BridgeState::Relayed);
        assert_eq!(total_donated(&container, 2).await, 750);

        // Nothing left to resume.
        assert!(restarted.resume_stuck().await.unwrap().is_empty());
        assert_eq!(chains.source.burn_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_after_burn_refused() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();
        let chains = container.local_chains().unwrap();

        chains.attestations.set_outage(true);
        let stuck = container
            .bridge()
            .execute_bridge(request(10, 0))
            .await
            .unwrap();
        assert!(container.bridge().cancel(stuck.id).await.is_err());
    }

    #[tokio::test]
    async fn test_runtime_feed_shows_bridged_credit() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();
        let runtime = AidRuntime::new(container);
        runtime.start();

        let container = runtime.container();
        container
            .bridge()
            .execute_bridge(request(500, 0))
            .await
            .unwrap();

        let feed = container.feed();
        for _ in 0..100 {
            if !feed.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let entries = feed.for_pool(0, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 500);

        runtime.shutdown().await;
    }
}
