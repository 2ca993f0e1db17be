//! Error types for the interaction relay.
use thiserror::Error;
use votes_ledger_repository::InteractionLogError;

/// Represents errors that stop a relay drain before any entry was attempted.
///
/// Failures delivering individual entries are recorded on the entry and never
/// surface here.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Interaction log error: {0}")]
    InteractionLog(#[from] InteractionLogError),
}
