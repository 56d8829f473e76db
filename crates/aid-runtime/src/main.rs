//! # Aid Runtime
//!
//! Runs the relief-pool ledger, bridge recovery and activity feed until
//! Ctrl+C.
//!
//! `AID_RELAYER_SEED` (64 hex chars) supplies the relayer key in RPC mode.

use anyhow::{bail, Context, Result};
use tracing::info;

use aid_runtime::{AidContainer, AidRuntime, RuntimeConfig};
use shared_crypto::WalletKeypair;

/// Relayer key from `AID_RELAYER_SEED`, if set.
fn load_relayer() -> Result<Option<WalletKeypair>> {
    let Ok(seed_hex) = std::env::var("AID_RELAYER_SEED") else {
        return Ok(None);
    };
    let bytes = hex::decode(seed_hex.trim()).context("AID_RELAYER_SEED is not hex")?;
    let Ok(seed) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("AID_RELAYER_SEED must be 32 bytes (64 hex chars)");
    };
    Ok(Some(WalletKeypair::from_seed(seed)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("loading configuration")?;
    aid_telemetry::init_telemetry(&config.telemetry).context("initializing telemetry")?;

    let relayer = load_relayer()?;
    let container = AidContainer::new(config, relayer)
        .await
        .context("assembling runtime")?;

    let runtime = AidRuntime::new(container);
    runtime.start();

    info!("Runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
