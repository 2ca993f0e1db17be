//! # Votes Ledger Pipeline
//! This crate implements the vote and reputation ledger on top of the ledger
//! repository: the validation gate, vote state resolution, counter projection,
//! reputation accounting, the read-side queries and the relay that drains the
//! interaction outbox into the interaction log.
//!
//! [`service::LedgerService`] ties the stages together and is the entry point
//! used by the presentation layer.
pub mod accountant;
pub mod gate;
pub mod projector;
pub mod query;
pub mod relay;
pub mod resolver;
pub mod service;

pub mod errors;

pub use errors::{LedgerError, RelayError};
pub use relay::{InteractionRelay, RelayConfig, RelaySignal};
pub use service::LedgerService;
