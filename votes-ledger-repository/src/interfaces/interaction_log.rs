use votes_ledger_shared::types::{Interaction, OutboxEntry, OutboxId, UserId};

use crate::errors::InteractionLogError;

/// Trait for draining the interaction outbox into the append-only interaction log.
///
/// Delivery is at-least-once: an entry may be handed out again until it has been
/// marked delivered, and delivering the same entry twice yields the same record.
#[async_trait::async_trait]
pub trait InteractionLogRepository: Send + Sync {
    /// Returns up to `limit` undelivered outbox entries, oldest first.
    async fn get_pending_interactions(&self, limit: i64) -> Result<Vec<OutboxEntry>, InteractionLogError>;

    /// Appends the entry to the interaction log and marks it delivered in one transaction.
    async fn deliver_interaction(&self, entry: &OutboxEntry) -> Result<Interaction, InteractionLogError>;

    /// Records a failed delivery attempt for an entry.
    async fn record_delivery_failure(&self, id: OutboxId, reason: &str) -> Result<(), InteractionLogError>;

    /// Returns the most recent interactions performed by a user, newest first.
    async fn get_user_interactions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Interaction>, InteractionLogError>;
}
