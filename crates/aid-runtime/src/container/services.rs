//! # Service Container
//!
//! ## Initialization Order
//!
//! ```text
//! 1. Event bus, transaction feed
//! 2. Ledger (local host or RPC client), transaction builder, reader
//! 3. Source chain, attestation service, relay, session store
//! 4. Bridge orchestrator
//! 5. Local mode only: config and pools created through admin transactions
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use al_01_address_derivation::AddressDeriver;
use al_02_settlement::{
    InMemoryLedgerStore, SettlementEngine, SettlementService, SystemClock, TransactionFeed,
};
use al_03_transaction_builder::{
    AccountFetcher, ConfirmationPolicy, Intent, KeypairSigner, LedgerClient, LedgerReader,
    PoolAccount, SolanaRpcClient, TransactionBuilder,
};
use al_04_cross_chain_bridge::{
    AttestationService, BridgeOrchestrator, DonationRelay, EvmRpcWallet, IrisAttestationClient,
    JsonFileSessionStore, LedgerClientRelay, SessionStore, SettlementRelay,
    SimulatedAttestationService, SimulatedSourceChain, SourceChain,
};
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_crypto::{AttesterKey, WalletKeypair};
use shared_types::{PoolId, Pubkey};

use crate::adapters::LocalLedger;
use crate::container::config::{LedgerMode, RuntimeConfig};
use crate::errors::RuntimeError;

/// Settlement service behind the local host.
pub type LocalSettlement = SettlementService<InMemoryLedgerStore, SystemClock, InMemoryEventBus>;

/// In-process primary chain.
pub type LocalHost = LocalLedger<InMemoryLedgerStore, SystemClock, InMemoryEventBus>;

/// Pending answers the simulated attestation service gives per burn.
const LOCAL_PENDING_POLLS: u32 = 2;

/// Display name of a well-known pool.
pub fn pool_name(id: PoolId) -> String {
    match id {
        0 => "Ukraine Humanitarian Fund".to_string(),
        1 => "Gaza Emergency Relief".to_string(),
        2 => "Sudan Displacement Support".to_string(),
        other => format!("Pool {other}"),
    }
}

/// Handles that only exist when the chains are simulated.
pub struct LocalChains {
    /// Primary chain host.
    pub host: LocalHost,
    /// Admin wallet client, already used for bootstrap.
    pub admin: LedgerClient<LocalHost, KeypairSigner>,
    /// Admin address.
    pub admin_key: Pubkey,
    /// Simulated source chain.
    pub source: Arc<SimulatedSourceChain>,
    /// Simulated attestation service.
    pub attestations: Arc<SimulatedAttestationService>,
}

impl LocalChains {
    /// Client signing with `wallet` against the local host.
    pub fn client(
        &self,
        builder: TransactionBuilder,
        wallet: WalletKeypair,
    ) -> LedgerClient<LocalHost, KeypairSigner> {
        LedgerClient::new(builder, self.host.clone(), KeypairSigner::new(wallet))
    }
}

/// Central container holding every runtime component.
pub struct AidContainer {
    config: RuntimeConfig,
    event_bus: Arc<InMemoryEventBus>,
    feed: Arc<TransactionFeed>,
    builder: TransactionBuilder,
    reader: LedgerReader<Arc<dyn AccountFetcher>>,
    bridge: BridgeOrchestrator,
    local: Option<LocalChains>,
}

impl AidContainer {
    /// Build the container for the configured mode.
    ///
    /// `relayer` signs bridged credits in RPC mode and is ignored locally.
    pub async fn new(
        config: RuntimeConfig,
        relayer: Option<WalletKeypair>,
    ) -> Result<Self, RuntimeError> {
        match config.ledger.mode {
            LedgerMode::Local => Self::local(config).await,
            LedgerMode::Rpc => Self::remote(config, relayer.ok_or(RuntimeError::MissingRelayer)?),
        }
    }

    /// In-process ledger with simulated bridge counterparts.
    #[instrument(skip_all)]
    pub async fn local(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        info!("[runtime] Initializing local ledger host...");

        let event_bus = Arc::new(InMemoryEventBus::new());
        let deriver = AddressDeriver::new(config.ledger.program_id);
        let builder = transaction_builder(&config, deriver);

        let engine = SettlementEngine::with_deriver(
            InMemoryLedgerStore::new(),
            Arc::new(SystemClock),
            deriver,
        );
        let service: LocalSettlement = SettlementService::new(engine, Arc::clone(&event_bus));
        let host = LocalLedger::new(service.clone());

        let source = Arc::new(SimulatedSourceChain::new(config.bridge.source));
        let attestations = Arc::new(SimulatedAttestationService::new(
            Arc::clone(&source),
            vec![AttesterKey::generate()],
            LOCAL_PENDING_POLLS,
        ));

        let admin_wallet = WalletKeypair::generate();
        let admin_key = admin_wallet.pubkey();
        let admin = LedgerClient::new(builder, host.clone(), KeypairSigner::new(admin_wallet))
            .with_policy(ConfirmationPolicy::new(config.ledger.commitment));
        let chains = LocalChains {
            host: host.clone(),
            admin,
            admin_key,
            source: Arc::clone(&source),
            attestations: Arc::clone(&attestations),
        };
        bootstrap(&config, &chains).await?;

        let store: Arc<dyn SessionStore> =
            Arc::new(JsonFileSessionStore::open(&config.bridge.session_dir)?);
        let bridge = BridgeOrchestrator::new(
            builder,
            source as Arc<dyn SourceChain>,
            attestations as Arc<dyn AttestationService>,
            Arc::new(SettlementRelay::new(service)) as Arc<dyn DonationRelay>,
            store,
            Arc::clone(&event_bus) as Arc<dyn EventPublisher>,
        )
        .with_policy(config.bridge.policy());

        let fetcher: Arc<dyn AccountFetcher> = Arc::new(host);
        info!("[runtime] ✓ Local ledger ready");
        Ok(Self {
            reader: LedgerReader::new(fetcher, deriver),
            feed: Arc::new(TransactionFeed::default()),
            builder,
            bridge,
            event_bus,
            local: Some(chains),
            config,
        })
    }

    /// Remote ledger, source chain and attestation API.
    #[instrument(skip_all)]
    pub fn remote(config: RuntimeConfig, relayer: WalletKeypair) -> Result<Self, RuntimeError> {
        config.validate()?;
        info!(
            "[runtime] Connecting to ledger at {} and source chain at {}",
            config.ledger.rpc_url, config.bridge.evm_rpc_url
        );

        let event_bus = Arc::new(InMemoryEventBus::new());
        let deriver = AddressDeriver::new(config.ledger.program_id);
        let builder = transaction_builder(&config, deriver);
        let commitment = config.ledger.commitment;

        let fetcher: Arc<dyn AccountFetcher> = Arc::new(
            SolanaRpcClient::new(config.ledger.rpc_url.clone())?.with_commitment(commitment),
        );
        let relayer_key = relayer.pubkey();
        let relay_client = LedgerClient::new(
            builder,
            SolanaRpcClient::new(config.ledger.rpc_url.clone())?.with_commitment(commitment),
            KeypairSigner::new(relayer),
        )
        .with_policy(ConfirmationPolicy::new(commitment));

        let store: Arc<dyn SessionStore> =
            Arc::new(JsonFileSessionStore::open(&config.bridge.session_dir)?);
        let bridge = BridgeOrchestrator::new(
            builder,
            Arc::new(EvmRpcWallet::new(config.bridge.evm_rpc_url.clone())?) as Arc<dyn SourceChain>,
            Arc::new(IrisAttestationClient::new(config.bridge.iris_url.clone())?)
                as Arc<dyn AttestationService>,
            Arc::new(LedgerClientRelay::new(relay_client, relayer_key)) as Arc<dyn DonationRelay>,
            store,
            Arc::clone(&event_bus) as Arc<dyn EventPublisher>,
        )
        .with_policy(config.bridge.policy());

        info!("[runtime] ✓ Relayer {}", relayer_key);
        Ok(Self {
            reader: LedgerReader::new(fetcher, deriver),
            feed: Arc::new(TransactionFeed::default()),
            builder,
            bridge,
            event_bus,
            local: None,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Shared event bus.
    pub fn event_bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Live donation and withdrawal feed.
    pub fn feed(&self) -> Arc<TransactionFeed> {
        Arc::clone(&self.feed)
    }

    /// Transaction builder bound to the configured program and networks.
    pub fn builder(&self) -> TransactionBuilder {
        self.builder
    }

    /// Account reader for dashboards.
    pub fn reader(&self) -> &LedgerReader<Arc<dyn AccountFetcher>> {
        &self.reader
    }

    /// Bridge orchestrator.
    pub fn bridge(&self) -> &BridgeOrchestrator {
        &self.bridge
    }

    /// Simulated chains, in local mode.
    pub fn local_chains(&self) -> Option<&LocalChains> {
        self.local.as_ref()
    }

    /// Every configured pool that exists on the ledger.
    pub async fn pools(&self) -> Result<Vec<PoolAccount>, RuntimeError> {
        Ok(self.reader.get_pools(&self.config.ledger.known_pools).await?)
    }
}

fn transaction_builder(config: &RuntimeConfig, deriver: AddressDeriver) -> TransactionBuilder {
    TransactionBuilder::new(deriver)
        .with_source(config.bridge.source)
        .with_destination_domain(config.ledger.local_domain)
}

/// Initialize the ledger and create the configured pools, as the admin.
async fn bootstrap(config: &RuntimeConfig, chains: &LocalChains) -> Result<(), RuntimeError> {
    let admin_key = chains.admin_key;
    chains
        .admin
        .execute(&Intent::Initialize {
            admin: admin_key,
            attesters: chains.attestations.attester_addresses(),
            threshold: 1,
            local_domain: config.ledger.local_domain,
        })
        .await?;

    for &pool_id in &config.ledger.known_pools {
        chains
            .admin
            .execute(&Intent::CreatePool {
                admin: admin_key,
                pool_id,
                name: pool_name(pool_id),
            })
            .await?;
    }
    info!(
        "[runtime] Bootstrapped {} pools, admin {}",
        config.ledger.known_pools.len(),
        admin_key
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_03_transaction_builder::BuilderError;
    use al_02_settlement::ErrorCode;

    fn config(dir: &tempfile::TempDir) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.bridge.session_dir = dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_local_bootstrap_creates_known_pools() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();

        let pools = container.pools().await.unwrap();
        assert_eq!(pools.len(), 3);
        assert_eq!(pools[0].pool.name, "Ukraine Humanitarian Fund");
        assert_eq!(pools[2].pool.name, "Sudan Displacement Support");
        assert!(pools.iter().all(|p| p.pool.is_active && p.balance == 0));

        let chains = container.local_chains().unwrap();
        let config = container.reader().get_config().await.unwrap().unwrap();
        assert_eq!(config.admin, chains.admin_key);
        assert_eq!(config.attesters, chains.attestations.attester_addresses());
    }

    #[tokio::test]
    async fn test_rpc_mode_requires_relayer() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        config.ledger.mode = LedgerMode::Rpc;
        assert!(matches!(
            AidContainer::new(config, None).await,
            Err(RuntimeError::MissingRelayer)
        ));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_create_pool() {
        let dir = tempfile::tempdir().unwrap();
        let container = AidContainer::local(config(&dir)).await.unwrap();
        let chains = container.local_chains().unwrap();

        let stranger = WalletKeypair::from_seed([9u8; 32]);
        let stranger_key = stranger.pubkey();
        let err = chains
            .client(container.builder(), stranger)
            .execute(&Intent::CreatePool {
                admin: stranger_key,
                pool_id: 7,
                name: "Unauthorized".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BuilderError::Rejected(ErrorCode::UnauthorizedAdmin));
    }

    #[test]
    fn test_pool_names() {
        assert_eq!(pool_name(1), "Gaza Emergency Relief");
        assert_eq!(pool_name(42), "Pool 42");
    }
}
