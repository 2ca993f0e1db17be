//! In-memory implementation of the ledger and interaction log repositories.
//!
//! Transactions take an owned lock on the whole state and work on a copy that is
//! swapped in on commit, so they are fully serialized and a dropped transaction
//! leaves no trace. Faults can be injected to exercise rollback and replay paths.
mod ledger_repository;

pub use ledger_repository::{InMemoryLedgerRepository, InMemoryLedgerTransaction};
