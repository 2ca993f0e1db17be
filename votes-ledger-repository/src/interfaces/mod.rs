//! This module defines and re-exports the interfaces for the ledger repository.
//! It serves as a central point for accessing traits related to data interaction.
mod interaction_log;
mod ledger;

pub use interaction_log::InteractionLogRepository;
pub use ledger::{LedgerRepository, LedgerTransaction};
