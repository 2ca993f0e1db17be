//! Error types for the ledger repository.
//! Defines specific errors that can occur during database operations on votes,
//! vote counters, reputation and collections.
use thiserror::Error;
use votes_ledger_shared::types::{TargetRef, UserId};

/// Represents errors that can occur within the ledger repository.
#[derive(Debug, Error)]
pub enum LedgerRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Target not found: {0}")]
    TargetNotFound(TargetRef),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Vote by user {user_id} on {target} already exists")]
    DuplicateVote { user_id: UserId, target: TargetRef },

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
