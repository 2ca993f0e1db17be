//! Error types for the votes ledger repository.
//! Consolidates and re-exports error types related to ledger and interaction log operations.
mod interaction_log;
mod ledger;

pub use interaction_log::InteractionLogError;
pub use ledger::LedgerRepositoryError;
