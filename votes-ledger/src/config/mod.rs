//! Configuration module for the Votes Ledger.
//! Reads settings from the environment and wires up application dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::LedgerConfig;
