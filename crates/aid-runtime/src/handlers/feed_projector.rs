//! # Feed Projector
//!
//! Folds donation and withdrawal events from the bus into the live
//! transaction feed until shutdown or until the bus closes.

use al_02_settlement::TransactionFeed;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Handler keeping a [`TransactionFeed`] current.
pub struct FeedProjector {
    subscription: Subscription,
    feed: Arc<TransactionFeed>,
}

impl FeedProjector {
    /// Subscribe to money movements on `bus`.
    pub fn new(bus: &InMemoryEventBus, feed: Arc<TransactionFeed>) -> Self {
        let filter = EventFilter::topics(vec![EventTopic::Donations, EventTopic::Withdrawals]);
        Self {
            subscription: bus.subscribe(filter),
            feed,
        }
    }

    /// Run the handler loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[feed] Feed projector started");
        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => {
                        if self.feed.apply(&event) {
                            debug!("[feed] {} entries", self.feed.len());
                        }
                    }
                    None => {
                        info!("[feed] Event bus closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("[feed] Shutdown signal received");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventPublisher, LedgerEvent};
    use shared_types::Pubkey;
    use std::time::Duration;

    #[tokio::test]
    async fn test_projects_donations_until_shutdown() {
        let bus = InMemoryEventBus::new();
        let feed = Arc::new(TransactionFeed::default());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(FeedProjector::new(&bus, Arc::clone(&feed)).run(rx));

        bus.publish(LedgerEvent::DonationReceived {
            pool_id: 1,
            donor: Pubkey::new([3u8; 32]),
            amount: 250,
            timestamp: 1_700_000_000,
        })
        .await;

        for _ in 0..50 {
            if !feed.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(feed.for_pool(1, 10).len(), 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
