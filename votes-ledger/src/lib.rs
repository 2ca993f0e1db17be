//! Votes Ledger Library
//!
//! Wires the vote and reputation ledger to PostgreSQL and exposes it over
//! HTTP: configuration loading, dependency setup, error handling and the
//! axum router.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Dependencies, LedgerConfig};
pub use errors::LedgerAppError;
