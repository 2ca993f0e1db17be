//! PostgreSQL implementation of the votes ledger repository.
//!
//! Provides a PostgreSQL backend for the `LedgerRepository` and
//! `InteractionLogRepository` traits with connection pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Target rows locked with `SELECT ... FOR UPDATE` before the vote row is read
//! - Counters and reputation adjusted with in-place increments, never read-modify-write
//! - Idempotent outbox delivery with `ON CONFLICT (outbox_id)`
//!
//! ## Database Tables
//!
//! - `users`: reputation scalar per user
//! - `questions` / `answers`: vote targets with `upvotes` and `downvotes` counters
//! - `votes`: one row per (author_id, action_id, action_type)
//! - `collections`: saved questions per user
//! - `interaction_outbox`: interactions written by ledger transactions, pending delivery
//! - `interactions`: append-only interaction log
mod interaction_log_repository;
mod ledger_repository;

pub use interaction_log_repository::PostgresInteractionLogRepository;
pub use ledger_repository::{PostgresLedgerRepository, PostgresLedgerTransaction};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");

/// Applies every pending migration to the database behind `pool`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
