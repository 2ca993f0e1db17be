pub(crate) mod ledger;
mod relay;

pub use ledger::LedgerError;
pub use relay::RelayError;
