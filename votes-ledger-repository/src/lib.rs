//! # Votes Ledger Repository
//! This crate provides traits and implementations for interacting with the
//! ledger data store. It includes definitions for errors, interfaces,
//! a PostgreSQL implementation and an in-memory implementation.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{InteractionLogError, LedgerRepositoryError};
pub use interfaces::{InteractionLogRepository, LedgerRepository, LedgerTransaction};
pub use memory::InMemoryLedgerRepository;
pub use postgres::{PostgresInteractionLogRepository, PostgresLedgerRepository};
