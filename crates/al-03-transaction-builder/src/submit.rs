//! # Submission and Confirmation
//!
//! A transaction counts as done only once its signature reaches the
//! policy's commitment. `Processed` is never success: it can still be
//! rolled back. The wait ends with `BlockhashExpired` once the chain passes
//! the anchor's last valid height, since the transaction can no longer land.

use crate::builder::TransactionBuilder;
use crate::domain::{
    BuilderError, Commitment, Intent, LivenessAnchor, SignedTransaction, TxSignature,
};
use crate::ports::outbound::{BlockhashProvider, TransactionSubmitter, WalletSigner};
use aid_telemetry::metric_inc;
use aid_telemetry::metrics::TX_SUBMISSIONS;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of consecutive transient errors tolerated while polling.
pub const DEFAULT_MAX_TRANSIENT_ERRORS: u32 = 10;

/// How long and how deep to wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    commitment: Commitment,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Consecutive network errors tolerated before giving up.
    pub max_transient_errors: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(Commitment::Confirmed)
    }
}

impl ConfirmationPolicy {
    /// Policy waiting for `commitment`, raised to at least `Confirmed`.
    pub fn new(commitment: Commitment) -> Self {
        Self {
            commitment: commitment.max(Commitment::Confirmed),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_transient_errors: DEFAULT_MAX_TRANSIENT_ERRORS,
        }
    }

    /// Wait for finality instead of confirmation.
    pub fn finalized() -> Self {
        Self::new(Commitment::Finalized)
    }

    /// Change the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Commitment a status must reach.
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }
}

/// Send `tx` and wait until it reaches the policy's commitment.
#[instrument(skip_all, fields(anchor_height = anchor.last_valid_block_height))]
pub async fn submit_and_confirm<N>(
    network: &N,
    tx: &SignedTransaction,
    anchor: &LivenessAnchor,
    policy: &ConfirmationPolicy,
) -> Result<TxSignature, BuilderError>
where
    N: BlockhashProvider + TransactionSubmitter + ?Sized,
{
    let signature = match network.send_transaction(tx).await {
        Ok(sig) => sig,
        Err(e) => {
            metric_inc!(TX_SUBMISSIONS, &["send_failed"]);
            warn!("[al-03] Send failed: {}", e);
            return Err(e);
        }
    };
    debug!("[al-03] Sent {}", signature);

    let mut transient = 0u32;
    loop {
        match poll_once(network, &signature, anchor, policy).await {
            Ok(Some(())) => {
                metric_inc!(TX_SUBMISSIONS, &["confirmed"]);
                info!(
                    "[al-03] {} reached {}",
                    signature,
                    policy.commitment()
                );
                return Ok(signature);
            }
            Ok(None) => transient = 0,
            Err(e) if e.is_retryable() && !matches!(e, BuilderError::BlockhashExpired { .. }) => {
                transient += 1;
                if transient > policy.max_transient_errors {
                    metric_inc!(TX_SUBMISSIONS, &["network_error"]);
                    return Err(e);
                }
                debug!("[al-03] Transient error while confirming {}: {}", signature, e);
            }
            Err(e) => {
                let outcome = match e {
                    BuilderError::BlockhashExpired { .. } => "expired",
                    BuilderError::Rejected(_) => "rejected",
                    _ => "failed",
                };
                metric_inc!(TX_SUBMISSIONS, &[outcome]);
                warn!("[al-03] {} not confirmed: {}", signature, e);
                return Err(e);
            }
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

/// One status check. `Some(())` once confirmed, `None` to keep waiting.
async fn poll_once<N>(
    network: &N,
    signature: &TxSignature,
    anchor: &LivenessAnchor,
    policy: &ConfirmationPolicy,
) -> Result<Option<()>, BuilderError>
where
    N: BlockhashProvider + TransactionSubmitter + ?Sized,
{
    if let Some(status) = network.signature_status(signature).await? {
        if let Some(failure) = status.error {
            return Err(BuilderError::from_program_failure(
                failure.code,
                failure.message,
            ));
        }
        if status.reached(policy.commitment()) {
            return Ok(Some(()));
        }
    }
    let current = network.block_height().await?;
    if anchor.is_expired_at(current) {
        return Err(BuilderError::BlockhashExpired {
            last_valid_block_height: anchor.last_valid_block_height,
            current,
        });
    }
    Ok(None)
}

/// Build, sign through the wallet, submit and confirm an intent.
pub struct LedgerClient<N, W> {
    builder: TransactionBuilder,
    network: N,
    wallet: W,
    policy: ConfirmationPolicy,
}

impl<N, W> LedgerClient<N, W>
where
    N: BlockhashProvider + TransactionSubmitter,
    W: WalletSigner,
{
    /// Client with the default confirmation policy.
    pub fn new(builder: TransactionBuilder, network: N, wallet: W) -> Self {
        Self {
            builder,
            network,
            wallet,
            policy: ConfirmationPolicy::default(),
        }
    }

    /// Replace the confirmation policy.
    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Transaction builder in use.
    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Network handle.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Run one intent end to end.
    #[instrument(skip(self), fields(intent = intent.name()))]
    pub async fn execute(&self, intent: &Intent) -> Result<TxSignature, BuilderError> {
        let signer = self.wallet.pubkey();
        let payer = intent.fee_payer();
        if signer != payer {
            return Err(BuilderError::SignerMismatch {
                expected: payer,
                got: signer,
            });
        }
        let unsigned = self.builder.build_fresh(intent, &self.network).await?;
        let anchor = unsigned.anchor;
        let signed = self.wallet.sign_transaction(unsigned).await?;
        submit_and_confirm(&self.network, &signed, &anchor, &self.policy).await
    }
}
