//! # Transaction Path
//!
//! Intents built by the transaction builder, signed by a test wallet and
//! executed by the in-process ledger host; results read back through the
//! account reader from encoded account bytes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aid_runtime::adapters::LocalLedger;
    use al_01_address_derivation::AddressDeriver;
    use al_02_settlement::{
        ErrorCode, InMemoryLedgerStore, ManualClock, SettlementEngine, SettlementService,
    };
    use al_03_transaction_builder::{
        BuilderError, Intent, KeypairSigner, LedgerClient, LedgerReader, TransactionBuilder,
        TransactionSubmitter, WalletSigner,
    };
    use shared_bus::InMemoryEventBus;
    use shared_crypto::{Ed25519Signature, WalletKeypair};
    use shared_types::EthAddress;

    type Host = LocalLedger<InMemoryLedgerStore, ManualClock, InMemoryEventBus>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ADMIN_SEED: [u8; 32] = [1u8; 32];
    const DONOR_SEED: [u8; 32] = [2u8; 32];
    const NGO_SEED: [u8; 32] = [3u8; 32];

    fn host() -> Host {
        let engine = SettlementEngine::new(
            InMemoryLedgerStore::new(),
            Arc::new(ManualClock::at(1_700_000_000)),
        );
        LocalLedger::new(SettlementService::new(
            engine,
            Arc::new(InMemoryEventBus::new()),
        ))
    }

    fn client(host: &Host, seed: [u8; 32]) -> LedgerClient<Host, KeypairSigner> {
        LedgerClient::new(
            TransactionBuilder::new(AddressDeriver::default()),
            host.clone(),
            KeypairSigner::new(WalletKeypair::from_seed(seed)),
        )
    }

    /// Initialized ledger with pool 0 created by the admin wallet.
    async fn bootstrapped() -> Host {
        let host = host();
        let admin = client(&host, ADMIN_SEED);
        let admin_key = WalletKeypair::from_seed(ADMIN_SEED).pubkey();
        admin
            .execute(&Intent::Initialize {
                admin: admin_key,
                attesters: vec![EthAddress([0x42; 20])],
                threshold: 1,
                local_domain: 5,
            })
            .await
            .unwrap();
        admin
            .execute(&Intent::CreatePool {
                admin: admin_key,
                pool_id: 0,
                name: "Ukraine".into(),
            })
            .await
            .unwrap();
        host
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_signed_donations_decode_through_reader() {
        let host = bootstrapped().await;
        let donor_key = WalletKeypair::from_seed(DONOR_SEED).pubkey();
        host.airdrop(donor_key, 5_000).await.unwrap();

        let donor = client(&host, DONOR_SEED);
        for _ in 0..2 {
            donor
                .execute(&Intent::Donate {
                    donor: donor_key,
                    pool_id: 0,
                    amount: 1000,
                })
                .await
                .unwrap();
        }

        let reader = LedgerReader::new(host.clone(), AddressDeriver::default());
        let account = reader.get_pool(0).await.unwrap().unwrap();
        assert_eq!(account.pool.name, "Ukraine");
        assert_eq!(account.pool.total_donated, 2000);
        assert_eq!(account.pool.total_withdrawn, 0);
        assert_eq!(account.balance, 2000);
        assert_eq!(account.address, AddressDeriver::default().pool(0).unwrap().address);
    }

    #[tokio::test]
    async fn test_ngo_withdrawal_round_trip() {
        let host = bootstrapped().await;
        let admin_key = WalletKeypair::from_seed(ADMIN_SEED).pubkey();
        let donor_key = WalletKeypair::from_seed(DONOR_SEED).pubkey();
        let ngo_key = WalletKeypair::from_seed(NGO_SEED).pubkey();
        host.airdrop(donor_key, 1_000).await.unwrap();

        client(&host, DONOR_SEED)
            .execute(&Intent::Donate {
                donor: donor_key,
                pool_id: 0,
                amount: 1000,
            })
            .await
            .unwrap();
        client(&host, ADMIN_SEED)
            .execute(&Intent::RegisterNgo {
                admin: admin_key,
                wallet: ngo_key,
                allowed_pools: vec![0],
                daily_limit: 300,
            })
            .await
            .unwrap();

        let ngo = client(&host, NGO_SEED);
        ngo.execute(&Intent::Withdraw {
            ngo_wallet: ngo_key,
            pool_id: 0,
            amount: 300,
        })
        .await
        .unwrap();
        let err = ngo
            .execute(&Intent::Withdraw {
                ngo_wallet: ngo_key,
                pool_id: 0,
                amount: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err, BuilderError::Rejected(ErrorCode::DailyLimitExceeded));

        let reader = LedgerReader::new(host.clone(), AddressDeriver::default());
        let (record, pools) = reader.pools_for_ngo(&ngo_key).await.unwrap().unwrap();
        assert_eq!(record.withdrawn_today, 300);
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].balance, 700);
    }

    #[tokio::test]
    async fn test_tampered_signature_refused() {
        let host = bootstrapped().await;
        let donor_key = WalletKeypair::from_seed(DONOR_SEED).pubkey();
        host.airdrop(donor_key, 1_000).await.unwrap();

        let builder = TransactionBuilder::new(AddressDeriver::default());
        let unsigned = builder
            .build_fresh(
                &Intent::Donate {
                    donor: donor_key,
                    pool_id: 0,
                    amount: 10,
                },
                &host,
            )
            .await
            .unwrap();
        let wallet = KeypairSigner::new(WalletKeypair::from_seed(DONOR_SEED));
        let mut signed = wallet.sign_transaction(unsigned).await.unwrap();
        signed.signatures[0] = Ed25519Signature::from_bytes([7u8; 64]);

        let err = host.send_transaction(&signed).await.unwrap_err();
        assert!(matches!(err, BuilderError::InvalidSignature { .. }));
        assert_eq!(host.service().balance(donor_key).await.unwrap(), 1_000);
    }

    #[tokio::test]
    async fn test_impersonated_admin_rejected() {
        let host = bootstrapped().await;
        let admin_key = WalletKeypair::from_seed(ADMIN_SEED).pubkey();

        // The donor wallet cannot sign a message whose fee payer is the admin.
        let err = client(&host, DONOR_SEED)
            .execute(&Intent::CreatePool {
                admin: admin_key,
                pool_id: 1,
                name: "Gaza".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BuilderError::SignerMismatch { .. }));
    }
}
