//! Error types for the Votes Ledger application.
//! Covers failures while loading configuration, connecting to the database,
//! applying migrations and serving HTTP.
#[derive(Debug, thiserror::Error)]
pub enum LedgerAppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Repository error: {0}")]
    Repository(#[from] votes_ledger_repository::LedgerRepositoryError),
    #[error("Interaction log error: {0}")]
    InteractionLog(#[from] votes_ledger_repository::InteractionLogError),
    #[error("Tracing error: {0}")]
    Tracing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
