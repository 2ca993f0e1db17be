// App state for the axum server
use std::sync::Arc;

use votes_ledger_pipeline::LedgerService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}
