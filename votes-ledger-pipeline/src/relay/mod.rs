//! Interaction relay.
//!
//! Drains the interaction outbox into the interaction log after ledger
//! transactions commit. Woken by [`RelaySignal`] right after a commit and on a
//! fixed interval, so entries left behind by a crash are replayed. Delivery is
//! at-least-once and never feeds back into the ledger: a failed entry is
//! recorded and retried on a later drain.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use votes_ledger_repository::InteractionLogRepository;

use crate::errors::RelayError;

/// Default number of outbox entries fetched per batch.
pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Default period between drains when no commit signals arrive.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wakes the relay after a commit that enqueued interactions.
#[derive(Clone, Default)]
pub struct RelaySignal(Arc<Notify>);

impl RelaySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a drain. Signals sent while the relay is busy are coalesced.
    pub fn notify(&self) {
        self.0.notify_one();
    }

    async fn notified(&self) {
        self.0.notified().await;
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub batch_size: i64,
    pub poll_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Counts of a single drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Moves committed outbox entries into the interaction log.
pub struct InteractionRelay {
    repository: Arc<dyn InteractionLogRepository>,
    config: RelayConfig,
    signal: RelaySignal,
}

impl InteractionRelay {
    /// Creates a new relay over `repository`.
    ///
    /// # Arguments
    ///
    /// * `repository` - Outbox and interaction log store
    /// * `config` - Batch size and polling period
    pub fn new(repository: Arc<dyn InteractionLogRepository>, config: RelayConfig) -> Self {
        Self {
            repository,
            config,
            signal: RelaySignal::new(),
        }
    }

    /// Handle used by writers to wake this relay.
    pub fn signal(&self) -> RelaySignal {
        self.signal.clone()
    }

    /// Delivers pending entries until the outbox is empty or a delivery fails.
    ///
    /// Stopping at the first failing batch keeps a persistently failing entry
    /// from spinning the loop; it is retried on the next drain.
    ///
    /// # Errors
    ///
    /// Returns a `RelayError` only when pending entries cannot be read.
    pub async fn drain_once(&self) -> Result<DrainReport, RelayError> {
        let mut report = DrainReport::default();
        loop {
            let batch = self.repository.get_pending_interactions(self.config.batch_size).await?;
            let fetched = batch.len();
            let mut batch_failed = false;

            for entry in &batch {
                match self.repository.deliver_interaction(entry).await {
                    Ok(interaction) => {
                        report.delivered += 1;
                        debug!(
                            outbox_id = entry.id,
                            interaction_id = interaction.id,
                            action = %interaction.action,
                            "Interaction delivered"
                        );
                    }
                    Err(e) => {
                        report.failed += 1;
                        batch_failed = true;
                        warn!(
                            outbox_id = entry.id,
                            attempts = entry.attempts + 1,
                            error = %e,
                            "Failed to deliver interaction"
                        );
                        if let Err(record_err) = self.repository.record_delivery_failure(entry.id, &e.to_string()).await {
                            warn!(outbox_id = entry.id, error = %record_err, "Failed to record delivery failure");
                        }
                    }
                }
            }

            if batch_failed || (fetched as i64) < self.config.batch_size {
                break;
            }
        }
        Ok(report)
    }

    async fn drain_and_log(&self) {
        match self.drain_once().await {
            Ok(report) if report.delivered > 0 || report.failed > 0 => {
                info!(delivered = report.delivered, failed = report.failed, "Interaction outbox drained");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read interaction outbox"),
        }
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped, then drains one last time.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Interaction relay started"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.signal.notified() => {}
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
            self.drain_and_log().await;
        }

        self.drain_and_log().await;
        info!("Interaction relay stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_ledger_repository::{InMemoryLedgerRepository, LedgerRepository};
    use votes_ledger_shared::types::{InteractionAction, NewInteraction, TargetRef};

    async fn enqueue(repository: &InMemoryLedgerRepository, count: usize) {
        let mut tx = repository.begin().await.unwrap();
        for i in 0..count {
            tx.enqueue_interaction(&NewInteraction {
                actor_id: 1,
                action: InteractionAction::Upvote,
                target: TargetRef::question(i as i64 + 1),
                author_id: 2,
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();
    }

    fn relay(repository: &InMemoryLedgerRepository, batch_size: i64) -> InteractionRelay {
        InteractionRelay::new(
            Arc::new(repository.clone()),
            RelayConfig { batch_size, poll_interval: Duration::from_secs(3600) },
        )
    }

    #[tokio::test]
    async fn test_drain_delivers_across_batches() {
        let repository = InMemoryLedgerRepository::new();
        enqueue(&repository, 5).await;

        let report = relay(&repository, 2).drain_once().await.unwrap();
        assert_eq!(report, DrainReport { delivered: 5, failed: 0 });
        assert!(repository.get_pending_interactions(10).await.unwrap().is_empty());
        assert_eq!(repository.get_user_interactions(1, 10).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried_later() {
        let repository = InMemoryLedgerRepository::new();
        enqueue(&repository, 1).await;
        repository.fail_deliveries().await;
        let relay = relay(&repository, 10);

        let report = relay.drain_once().await.unwrap();
        assert_eq!(report, DrainReport { delivered: 0, failed: 1 });
        let pending = repository.get_pending_interactions(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert!(repository.last_delivery_error(pending[0].id).await.is_some());

        repository.clear_faults().await;
        let report = relay.drain_once().await.unwrap();
        assert_eq!(report, DrainReport { delivered: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_run_drains_before_stopping() {
        let repository = InMemoryLedgerRepository::new();
        let relay = Arc::new(relay(&repository, 10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn({
            let relay = relay.clone();
            async move { relay.run(shutdown_rx).await }
        });

        enqueue(&repository, 3).await;
        relay.signal().notify();
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(repository.get_pending_interactions(10).await.unwrap().is_empty());
        assert_eq!(repository.get_user_interactions(1, 10).await.unwrap().len(), 3);
    }
}
