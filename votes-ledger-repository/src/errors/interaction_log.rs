use thiserror::Error;
use votes_ledger_shared::types::OutboxId;

#[derive(Debug, Error)]
/// Represents errors that can occur while reading the outbox or writing the interaction log.
pub enum InteractionLogError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid interaction action: {0}")]
    InvalidAction(String),

    #[error("Invalid target type: {0}")]
    InvalidTargetType(String),

    #[error("Outbox entry not found: {0}")]
    OutboxEntryNotFound(OutboxId),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
