use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use votes_ledger_pipeline::{InteractionRelay, LedgerService, RelayConfig};
use votes_ledger_repository::postgres::run_migrations;
use votes_ledger_repository::{PostgresInteractionLogRepository, PostgresLedgerRepository};

use crate::config::LedgerConfig;
use crate::errors::LedgerAppError;

/// `Dependencies` holds the components the ledger binary runs.
///
/// The service handles requests; the relay drains the interaction outbox the
/// service writes to, and is woken by the service after each commit.
pub struct Dependencies {
    pub pool: sqlx::PgPool,
    pub service: Arc<LedgerService>,
    pub relay: InteractionRelay,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL, applies the embedded migrations when enabled,
    /// and wires the repositories into the service and the relay.
    ///
    /// # Arguments
    ///
    /// * `config` - Settings loaded from the environment
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `LedgerAppError` if any dependency fails to initialize.
    pub async fn new(config: &LedgerConfig) -> Result<Self, LedgerAppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        if config.run_migrations {
            run_migrations(&pool).await?;
            info!("Database migrations applied");
        }

        let ledger = Arc::new(PostgresLedgerRepository::new(pool.clone()).await?);
        let interactions = Arc::new(PostgresInteractionLogRepository::new(pool.clone()).await?);

        let relay = InteractionRelay::new(
            interactions.clone(),
            RelayConfig {
                batch_size: config.relay_batch_size,
                poll_interval: config.relay_poll_interval,
            },
        );
        let service = Arc::new(LedgerService::new(ledger, interactions, relay.signal()));

        Ok(Dependencies { pool, service, relay })
    }
}
