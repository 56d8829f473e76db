//! # Event Publisher
//!
//! Ledger services hold an `EventPublisher`; the runtime hands them the
//! in-memory bus, standalone engines and tests get `NullPublisher`.

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Sink for committed ledger events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hand an event to every live receiver. Returns how many there were.
    async fn publish(&self, event: LedgerEvent) -> usize;
}

/// Broadcast bus shared by the ledger, the bridge and the feed projector.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
    sequence: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus holding up to `DEFAULT_CHANNEL_CAPACITY` undelivered events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus with a custom lag bound. Slow receivers past it skip ahead.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Pull-style subscription.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, pools = ?filter.pool_ids, "[bus] subscribe");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Same subscription as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Live receivers, filtered or not.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events accepted since the bus was created.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(seq, ?topic, receivers, "[bus] published");
                receivers
            }
            Err(_) => {
                // Nobody listening; the ledger state is already committed.
                trace!(seq, ?topic, "[bus] no receivers");
                0
            }
        }
    }
}

/// Publisher that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

#[async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, _event: LedgerEvent) -> usize {
        0
    }
}
