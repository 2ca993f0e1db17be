//! PostgreSQL-backed interaction outbox and interaction log.
//!
//! Ledger transactions write to `interaction_outbox`; this repository moves rows
//! from there into `interactions`, one transaction per row.
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use votes_ledger_shared::types::{
    Interaction, InteractionAction, NewInteraction, OutboxEntry, OutboxId, TargetRef, TargetType, UserId,
};

use crate::{InteractionLogError, InteractionLogRepository};

fn parse_action(raw: &str) -> Result<InteractionAction, InteractionLogError> {
    raw.parse().map_err(|_| InteractionLogError::InvalidAction(raw.to_string()))
}

fn parse_target(id: i64, raw_type: &str) -> Result<TargetRef, InteractionLogError> {
    let target_type: TargetType = raw_type
        .parse()
        .map_err(|_| InteractionLogError::InvalidTargetType(raw_type.to_string()))?;
    Ok(TargetRef { id, target_type })
}

fn outbox_entry_from_row(row: &PgRow) -> Result<OutboxEntry, InteractionLogError> {
    let action: String = row.try_get("action")?;
    let action_type: String = row.try_get("action_type")?;
    Ok(OutboxEntry {
        id: row.try_get("id")?,
        interaction: NewInteraction {
            actor_id: row.try_get("actor_id")?,
            action: parse_action(&action)?,
            target: parse_target(row.try_get("action_id")?, &action_type)?,
            author_id: row.try_get("author_id")?,
        },
        attempts: row.try_get("attempts")?,
        enqueued_at: row.try_get("enqueued_at")?,
    })
}

fn interaction_from_row(row: &PgRow) -> Result<Interaction, InteractionLogError> {
    let action: String = row.try_get("action")?;
    let action_type: String = row.try_get("action_type")?;
    Ok(Interaction {
        id: row.try_get("id")?,
        outbox_id: row.try_get("outbox_id")?,
        actor_id: row.try_get("user_id")?,
        action: parse_action(&action)?,
        target: parse_target(row.try_get("action_id")?, &action_type)?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL-backed interaction log repository.
pub struct PostgresInteractionLogRepository {
    /// PostgreSQL connection pool
    pool: sqlx::PgPool,
}

impl PostgresInteractionLogRepository {
    /// Creates a new PostgreSQL interaction log repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the ledger schema applied
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, InteractionLogError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl InteractionLogRepository for PostgresInteractionLogRepository {
    async fn get_pending_interactions(&self, limit: i64) -> Result<Vec<OutboxEntry>, InteractionLogError> {
        let rows = sqlx::query(
            r#"
            SELECT id, actor_id, action, action_id, action_type, author_id, attempts, enqueued_at
            FROM interaction_outbox
            WHERE delivered_at IS NULL
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(outbox_entry_from_row).collect()
    }

    /// Writes the interaction and stamps the outbox row in one transaction.
    ///
    /// A replayed entry hits the unique `outbox_id` constraint and returns the
    /// record written by the first delivery.
    async fn deliver_interaction(&self, entry: &OutboxEntry) -> Result<Interaction, InteractionLogError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO interactions (outbox_id, user_id, action, action_id, action_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (outbox_id) DO UPDATE SET outbox_id = EXCLUDED.outbox_id
            RETURNING id, outbox_id, user_id, action, action_id, action_type, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.interaction.actor_id)
        .bind(entry.interaction.action.as_str())
        .bind(entry.interaction.target.id)
        .bind(entry.interaction.target.target_type.as_str())
        .bind(entry.enqueued_at)
        .fetch_one(&mut *tx)
        .await?;
        let interaction = interaction_from_row(&row)?;

        let result = sqlx::query(
            r#"
            UPDATE interaction_outbox
            SET delivered_at = COALESCE(delivered_at, now()), attempts = attempts + 1
            WHERE id = $1
            "#,
        )
        .bind(entry.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InteractionLogError::OutboxEntryNotFound(entry.id));
        }

        tx.commit().await?;
        Ok(interaction)
    }

    async fn record_delivery_failure(&self, id: OutboxId, reason: &str) -> Result<(), InteractionLogError> {
        sqlx::query("UPDATE interaction_outbox SET attempts = attempts + 1, last_error = $2 WHERE id = $1")
            .bind(id)
            .bind(reason)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user_interactions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Interaction>, InteractionLogError> {
        let rows = sqlx::query(
            r#"
            SELECT id, outbox_id, user_id, action, action_id, action_type, created_at
            FROM interactions
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }
}
