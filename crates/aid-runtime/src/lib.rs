//! # Aid Runtime
//!
//! Assembles the relief-pool system into one process and keeps its
//! background work running.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the service container
//! - `adapters/` - the in-process ledger host
//! - `handlers/` - event bus consumers
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `AID_*` environment variables
//! 2. Build the container (local mode also bootstraps config and pools)
//! 3. Start the feed projector
//! 4. Sweep persisted bridge sessions that stopped after their burn
//! 5. Re-sweep periodically until shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use al_04_cross_chain_bridge::{BridgeApi, BridgeOrchestrator};

pub use container::{AidContainer, ConfigError, LedgerMode, RuntimeConfig};
pub use errors::RuntimeError;
pub use handlers::FeedProjector;

/// Delay between sweeps for resumable bridge sessions.
pub const RECOVERY_INTERVAL: Duration = Duration::from_secs(300);

/// How long shutdown waits for background tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The runtime owning the container and its background tasks.
pub struct AidRuntime {
    container: Arc<AidContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AidRuntime {
    /// Wrap an assembled container.
    pub fn new(container: AidContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start background handlers.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Aid Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Ledger mode: {:?}", self.container.config().ledger.mode);
        info!("===========================================");

        let projector = FeedProjector::new(&self.container.event_bus(), self.container.feed());
        let feed_task = tokio::spawn(projector.run(self.shutdown_rx.clone()));

        let bridge = self.container.bridge().clone();
        let recovery_task = tokio::spawn(run_recovery(bridge, self.shutdown_rx.clone()));

        self.tasks.lock().extend([feed_task, recovery_task]);
        info!(
            "[runtime] Pools: {:?}, sessions in {:?}",
            self.container.config().ledger.known_pools,
            self.container.config().bridge.session_dir
        );
    }

    /// Signal shutdown and wait briefly for handlers to stop.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                warn!("[runtime] Handler did not stop within {:?}", SHUTDOWN_GRACE);
            }
        }
        info!("Shutdown complete");
    }

    /// Shared container.
    pub fn container(&self) -> Arc<AidContainer> {
        Arc::clone(&self.container)
    }
}

/// Resume stuck or orphaned sessions at startup and then on an interval.
///
/// A sweep in progress is abandoned on shutdown; sessions keep their last
/// persisted state and are picked up by the next start.
async fn run_recovery(bridge: BridgeOrchestrator, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(RECOVERY_INTERVAL);
    loop {
        tokio::select! {
            _ = sweep(&bridge, &mut ticker) => {}
            _ = shutdown.changed() => {
                info!("[runtime] Shutdown signal received");
                break;
            }
        }
    }
}

async fn sweep(bridge: &BridgeOrchestrator, ticker: &mut tokio::time::Interval) {
    ticker.tick().await;
    match bridge.resume_stuck().await {
        Ok(sessions) if sessions.is_empty() => {}
        Ok(sessions) => info!("[runtime] Recovery sweep drove {} sessions", sessions.len()),
        Err(e) => warn!("[runtime] Recovery sweep failed: {}", e),
    }
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
