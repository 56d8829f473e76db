//! # Bridge Orchestrator
//!
//! Drives sessions through approve, burn, attestation and relay.
//!
//! ## Safety Rules
//!
//! - Every state change is persisted before the next external call.
//! - The burn transaction hash is persisted before its receipt is awaited,
//!   and a recorded burn is never sent again.
//! - Once a burn may exist a session never becomes `Failed`: it either
//!   finishes or parks as `Stuck` and can be resumed.
//! - A replayed credit is reported by the ledger and treated as success.
//! - At most one task drives a session at a time.

use crate::algorithms::{burn_id, extract_message};
use crate::domain::{
    BridgeError, BridgePolicy, BridgeRequest, BridgeSession, BridgeState, SessionId,
};
use crate::ports::inbound::BridgeApi;
use crate::ports::outbound::{
    AttestationService, AttestationStatus, DonationRelay, RelayOutcome, SessionStore, SourceChain,
};
use aid_telemetry::log_session_event;
use aid_telemetry::metric_inc;
use aid_telemetry::metrics::{
    ATTESTATION_POLLS, ATTESTATION_WAIT, BRIDGE_ACTIVE_SESSIONS, BRIDGE_TRANSITIONS,
};
use al_03_transaction_builder::{BridgeCalls, BridgeIntent, TransactionBuilder};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::Hash;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

const COMPONENT: &str = "al-04";

#[derive(Default)]
struct Control {
    in_flight: HashSet<SessionId>,
    cancelled: HashSet<SessionId>,
}

/// Marks a session as driven until dropped.
struct FlightGuard {
    control: Arc<Mutex<Control>>,
    id: SessionId,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut control = self.control.lock();
        control.in_flight.remove(&self.id);
        control.cancelled.remove(&self.id);
        BRIDGE_ACTIVE_SESSIONS.dec();
    }
}

/// The bridge orchestrator.
#[derive(Clone)]
pub struct BridgeOrchestrator {
    builder: TransactionBuilder,
    source: Arc<dyn SourceChain>,
    attestations: Arc<dyn AttestationService>,
    relay: Arc<dyn DonationRelay>,
    store: Arc<dyn SessionStore>,
    events: Arc<dyn EventPublisher>,
    policy: BridgePolicy,
    control: Arc<Mutex<Control>>,
}

impl BridgeOrchestrator {
    /// Orchestrator with the default polling policy.
    pub fn new(
        builder: TransactionBuilder,
        source: Arc<dyn SourceChain>,
        attestations: Arc<dyn AttestationService>,
        relay: Arc<dyn DonationRelay>,
        store: Arc<dyn SessionStore>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            builder,
            source,
            attestations,
            relay,
            store,
            events,
            policy: BridgePolicy::default(),
            control: Arc::new(Mutex::new(Control::default())),
        }
    }

    /// Replace the polling policy.
    pub fn with_policy(mut self, policy: BridgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Polling policy in use.
    pub fn policy(&self) -> BridgePolicy {
        self.policy
    }

    /// Every stored session, oldest first.
    pub fn sessions(&self) -> Result<Vec<BridgeSession>, BridgeError> {
        self.store.list()
    }

    /// Whether a task is currently driving `id`.
    pub fn is_in_flight(&self, id: &SessionId) -> bool {
        self.control.lock().in_flight.contains(id)
    }

    fn calls(&self, request: &BridgeRequest) -> Result<BridgeCalls, BridgeError> {
        let intent = BridgeIntent {
            owner: request.owner,
            amount: request.amount,
            destination_pool: request.destination_pool,
        };
        self.builder.bridge_calls(&intent).map_err(|e| {
            if e.is_validation() {
                BridgeError::InvalidRequest(e.to_string())
            } else {
                BridgeError::Builder(e)
            }
        })
    }

    fn claim(&self, id: SessionId) -> Result<FlightGuard, BridgeError> {
        if !self.control.lock().in_flight.insert(id) {
            return Err(BridgeError::SessionBusy(id));
        }
        BRIDGE_ACTIVE_SESSIONS.inc();
        Ok(FlightGuard {
            control: Arc::clone(&self.control),
            id,
        })
    }

    fn take_cancel(&self, id: &SessionId) -> bool {
        self.control.lock().cancelled.remove(id)
    }

    async fn announce(&self, session: &BridgeSession) {
        metric_inc!(BRIDGE_TRANSITIONS, &[session.state.as_str()]);
        log_session_event!(
            info,
            COMPONENT,
            "Bridge session updated",
            session.id,
            state = %session.state,
            pool_id = session.request.destination_pool
        );
        self.events
            .publish(LedgerEvent::BridgeSessionUpdated {
                session_id: session.id,
                state: session.state.as_str().to_string(),
                destination_pool: session.request.destination_pool,
                amount: session.request.amount,
                burn_id: session.burn_id,
            })
            .await;
    }

    async fn commit(
        &self,
        session: &mut BridgeSession,
        next: BridgeState,
    ) -> Result<(), BridgeError> {
        session.transition_to(next)?;
        self.store.save(session)?;
        self.announce(session).await;
        Ok(())
    }

    async fn fail(
        &self,
        session: &mut BridgeSession,
        next: BridgeState,
        cause: BridgeError,
    ) -> Result<(), BridgeError> {
        warn!("[al-04] Session {} -> {}: {}", session.id, next, cause);
        session.fail_to(next, &cause)?;
        self.store.save(session)?;
        self.announce(session).await;
        Ok(())
    }

    /// Persist a new Idle session, already claimed so that a cancel
    /// arriving before the driver starts is seen as in flight.
    async fn create(
        &self,
        request: BridgeRequest,
    ) -> Result<(BridgeSession, FlightGuard), BridgeError> {
        self.calls(&request)?;
        let session = BridgeSession::new(request);
        let guard = self.claim(session.id)?;
        self.store.save(&session)?;
        self.announce(&session).await;
        Ok((session, guard))
    }

    async fn drive(&self, mut session: BridgeSession) -> Result<BridgeSession, BridgeError> {
        loop {
            match session.state {
                BridgeState::Idle => self.approve_and_burn(&mut session).await?,
                BridgeState::Approving => {
                    let cause = BridgeError::SourceChain("interrupted during approval".into());
                    self.fail(&mut session, BridgeState::Failed, cause).await?;
                }
                BridgeState::Burning => self.confirm_burn(&mut session).await?,
                BridgeState::AwaitingAttestation => self.await_attestation(&mut session).await?,
                BridgeState::Attested => self.relay_credit(&mut session).await?,
                BridgeState::Relayed | BridgeState::Failed | BridgeState::Stuck => {
                    return Ok(session)
                }
            }
        }
    }

    /// Idle → Approving → Burning, ending with the burn sent and recorded.
    async fn approve_and_burn(&self, session: &mut BridgeSession) -> Result<(), BridgeError> {
        if let Some(stored) = self.store.load(&session.id)? {
            if stored.state != session.state {
                warn!(
                    "[al-04] Session {} is {} in the store, not approving",
                    session.id, stored.state
                );
                *session = stored;
                return Ok(());
            }
        }
        let calls = self.calls(&session.request)?;
        if self.take_cancel(&session.id) {
            let cause = BridgeError::InvalidRequest("cancelled".into());
            return self.fail(session, BridgeState::Failed, cause).await;
        }

        self.commit(session, BridgeState::Approving).await?;
        let approve_tx = match self.source.send_call(&calls.approve).await {
            Ok(tx) => tx,
            Err(e) => return self.fail(session, BridgeState::Failed, e).await,
        };
        session.approve_tx = Some(approve_tx);
        self.store.save(session)?;

        match self.source.wait_for_receipt(&approve_tx).await {
            Ok(receipt) if receipt.success => {}
            Ok(_) => {
                let cause = BridgeError::Reverted(approve_tx);
                return self.fail(session, BridgeState::Failed, cause).await;
            }
            Err(e) => return self.fail(session, BridgeState::Failed, e).await,
        }

        // Cancellation and the move to Burning are decided under one lock.
        let cancelled = {
            let mut control = self.control.lock();
            if control.cancelled.remove(&session.id) {
                true
            } else {
                session.transition_to(BridgeState::Burning)?;
                self.store.save(session)?;
                false
            }
        };
        if cancelled {
            let cause = BridgeError::InvalidRequest("cancelled".into());
            return self.fail(session, BridgeState::Failed, cause).await;
        }
        self.announce(session).await;

        match self.source.send_call(&calls.burn).await {
            Ok(tx) => {
                session.burn_tx = Some(tx);
                self.store.save(session)?;
                info!("[al-04] Burn sent for session {}: 0x{}", session.id, hex::encode(tx));
                Ok(())
            }
            Err(e) => self.fail(session, BridgeState::Failed, e).await,
        }
    }

    /// Burning → AwaitingAttestation once the receipt yields the message.
    async fn confirm_burn(&self, session: &mut BridgeSession) -> Result<(), BridgeError> {
        let Some(burn_tx) = session.burn_tx else {
            let cause = BridgeError::SourceChain("no burn transaction recorded".into());
            return self.fail(session, BridgeState::Stuck, cause).await;
        };
        let receipt = match self.source.wait_for_receipt(&burn_tx).await {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(session, BridgeState::Stuck, e).await,
        };
        if !receipt.success {
            return self
                .fail(session, BridgeState::Failed, BridgeError::Reverted(burn_tx))
                .await;
        }
        let Some(message) = extract_message(&receipt) else {
            return self
                .fail(session, BridgeState::Stuck, BridgeError::MissingMessage)
                .await;
        };
        session.burn_id = Some(burn_id(&message));
        session.message = Some(message);
        session.attempts = 0;
        self.commit(session, BridgeState::AwaitingAttestation).await
    }

    /// AwaitingAttestation → Attested, or Stuck after the poll budget.
    async fn await_attestation(&self, session: &mut BridgeSession) -> Result<(), BridgeError> {
        let Some(id) = session.burn_id else {
            return self
                .fail(session, BridgeState::Stuck, BridgeError::MissingMessage)
                .await;
        };
        let started = Instant::now();
        session.attempts = 0;
        loop {
            if session.attempts >= self.policy.max_attempts {
                let cause = BridgeError::Attestation(format!(
                    "no attestation after {} polls",
                    session.attempts
                ));
                return self.fail(session, BridgeState::Stuck, cause).await;
            }
            if session.attempts > 0 {
                tokio::time::sleep(self.policy.poll_interval).await;
            }
            session.attempts += 1;

            match self.attestations.fetch_attestation(&id).await {
                Ok(AttestationStatus::Complete(attestation)) => {
                    metric_inc!(ATTESTATION_POLLS, &["complete"]);
                    ATTESTATION_WAIT.observe(started.elapsed().as_secs_f64());
                    session.attestation = Some(attestation);
                    return self.commit(session, BridgeState::Attested).await;
                }
                Ok(AttestationStatus::Pending) => {
                    metric_inc!(ATTESTATION_POLLS, &["pending"]);
                }
                Err(e) => {
                    metric_inc!(ATTESTATION_POLLS, &["error"]);
                    warn!("[al-04] Attestation poll failed for {}: {}", session.id, e);
                    session.last_error = Some(e.to_string());
                }
            }
            self.store.save(session)?;
        }
    }

    /// Attested → Relayed.
    async fn relay_credit(&self, session: &mut BridgeSession) -> Result<(), BridgeError> {
        let (Some(message), Some(attestation)) =
            (session.message.clone(), session.attestation.clone())
        else {
            return self
                .fail(session, BridgeState::Stuck, BridgeError::MissingMessage)
                .await;
        };
        let pool_id = session.request.destination_pool;
        match self.relay.relay(pool_id, &message, &attestation).await {
            Ok(RelayOutcome::Credited { amount }) => {
                info!("[al-04] Credited {} to pool {}", amount, pool_id);
                self.commit(session, BridgeState::Relayed).await
            }
            Ok(RelayOutcome::AlreadyCredited) => {
                session.already_credited = true;
                self.commit(session, BridgeState::Relayed).await
            }
            Err(e) => self.fail(session, BridgeState::Stuck, e).await,
        }
    }

    async fn resume_session(&self, id: SessionId) -> Result<BridgeSession, BridgeError> {
        let guard = self.claim(id)?;
        let mut session = self
            .store
            .load(&id)?
            .ok_or(BridgeError::SessionNotFound(id))?;

        match session.state {
            BridgeState::Relayed => return Ok(session),
            BridgeState::Stuck => {
                let next = session.resume_state();
                info!("[al-04] Resuming session {} at {}", id, next);
                self.commit(&mut session, next).await?;
            }
            BridgeState::Burning | BridgeState::AwaitingAttestation | BridgeState::Attested => {
                info!("[al-04] Picking up orphaned session {} at {}", id, session.state);
            }
            state @ (BridgeState::Idle | BridgeState::Approving | BridgeState::Failed) => {
                return Err(BridgeError::WrongState { id, state });
            }
        }

        let result = self.drive(session).await;
        drop(guard);
        result
    }
}

#[async_trait]
impl BridgeApi for BridgeOrchestrator {
    #[instrument(skip(self))]
    async fn initiate_bridge(&self, request: BridgeRequest) -> Result<SessionId, BridgeError> {
        let (session, guard) = self.create(request).await?;
        let id = session.id;
        let this = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = this.drive(session).await {
                error!("[al-04] Session {} halted: {}", id, e);
            }
        });
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn execute_bridge(&self, request: BridgeRequest) -> Result<BridgeSession, BridgeError> {
        let (session, _guard) = self.create(request).await?;
        self.drive(session).await
    }

    async fn resume(&self, burn_id: Hash) -> Result<BridgeSession, BridgeError> {
        let session = self
            .store
            .find_by_burn(&burn_id)?
            .ok_or(BridgeError::BurnNotFound(burn_id))?;
        self.resume_session(session.id).await
    }

    async fn resume_stuck(&self) -> Result<Vec<BridgeSession>, BridgeError> {
        let candidates: Vec<SessionId> = self
            .store
            .list()?
            .into_iter()
            .filter(|s| s.state.is_post_burn() && !s.state.is_terminal())
            .filter(|s| !self.is_in_flight(&s.id))
            .map(|s| s.id)
            .collect();

        let mut resumed = Vec::with_capacity(candidates.len());
        for id in candidates {
            match self.resume_session(id).await {
                Ok(session) => resumed.push(session),
                Err(e) => warn!("[al-04] Could not resume {}: {}", id, e),
            }
        }
        Ok(resumed)
    }

    async fn cancel(&self, id: SessionId) -> Result<BridgeSession, BridgeError> {
        let cancelled = {
            let mut control = self.control.lock();
            let mut session = self
                .store
                .load(&id)?
                .ok_or(BridgeError::SessionNotFound(id))?;
            if session.state.is_post_burn() {
                return Err(BridgeError::CannotCancelAfterBurn(id));
            }
            if session.state == BridgeState::Failed {
                return Ok(session);
            }
            if control.in_flight.contains(&id) {
                control.cancelled.insert(id);
                info!("[al-04] Cancellation requested for in-flight session {}", id);
                return Ok(session);
            }
            session.fail_to(
                BridgeState::Failed,
                &BridgeError::InvalidRequest("cancelled".into()),
            )?;
            self.store.save(&session)?;
            session
        };
        self.announce(&cancelled).await;
        Ok(cancelled)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<BridgeSession>, BridgeError> {
        self.store.load(&id)
    }

    async fn find_by_burn(&self, burn_id: Hash) -> Result<Option<BridgeSession>, BridgeError> {
        self.store.find_by_burn(&burn_id)
    }
}
