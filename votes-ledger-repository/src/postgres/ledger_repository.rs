use async_trait::async_trait;
use sqlx::Row;
use votes_ledger_shared::types::{
    CountDelta, InteractionAction, NewInteraction, OutboxId, TargetId, TargetRef, UserId, UserVote, VoteType, VotesCount,
};

use crate::{LedgerRepository, LedgerRepositoryError, LedgerTransaction};

fn parse_vote_type(raw: &str) -> Result<VoteType, LedgerRepositoryError> {
    raw.parse().map_err(|_| LedgerRepositoryError::InvalidVoteType(raw.to_string()))
}

/// PostgreSQL implementation of the ledger repository.
///
/// Reads go straight to the pool; every mutation goes through a
/// [`PostgresLedgerTransaction`].
pub struct PostgresLedgerRepository {
    pool: sqlx::PgPool,
}

impl PostgresLedgerRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the ledger schema applied
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresLedgerRepository)` - Ready-to-use repository instance
    /// * `Err(LedgerRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, LedgerRepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerRepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresLedgerTransaction { tx }))
    }

    async fn get_user_vote(
        &self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError> {
        let vote_type: Option<String> = sqlx::query_scalar(
            "SELECT vote_type FROM votes WHERE author_id = $1 AND action_id = $2 AND action_type = $3",
        )
        .bind(user_id)
        .bind(target.id)
        .bind(target.target_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        vote_type.as_deref().map(parse_vote_type).transpose()
    }

    async fn get_votes_count(&self, target: TargetRef) -> Result<Option<VotesCount>, LedgerRepositoryError> {
        let sql = format!("SELECT upvotes, downvotes FROM {} WHERE id = $1", target.target_type.table());
        let counts: Option<(i64, i64)> = sqlx::query_as(&sql)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(counts.map(|(upvotes, downvotes)| VotesCount { target, upvotes, downvotes }))
    }

    async fn get_reputation(&self, user_id: UserId) -> Result<Option<i64>, LedgerRepositoryError> {
        let reputation = sqlx::query_scalar("SELECT reputation FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reputation)
    }

    async fn has_saved_question(
        &self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError> {
        let saved = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM collections WHERE author_id = $1 AND question_id = $2)",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}

/// An open PostgreSQL transaction over the ledger tables.
///
/// Dropping it without committing rolls back through `sqlx::Transaction`'s drop.
pub struct PostgresLedgerTransaction {
    tx: sqlx::Transaction<'static, sqlx::Postgres>,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn find_target_author(&mut self, target: TargetRef) -> Result<Option<UserId>, LedgerRepositoryError> {
        let sql = format!("SELECT author_id FROM {} WHERE id = $1 FOR UPDATE", target.target_type.table());
        let author_id = sqlx::query_scalar(&sql)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(author_id)
    }

    async fn find_user_vote(
        &mut self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError> {
        let row = sqlx::query(
            "SELECT vote_type FROM votes WHERE author_id = $1 AND action_id = $2 AND action_type = $3 FOR UPDATE",
        )
        .bind(user_id)
        .bind(target.id)
        .bind(target.target_type.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => {
                let vote_type: String = row.try_get("vote_type")?;
                Ok(Some(parse_vote_type(&vote_type)?))
            }
            None => Ok(None),
        }
    }

    async fn insert_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO votes (author_id, action_id, action_type, vote_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(vote.user_id)
        .bind(vote.target.id)
        .bind(vote.target.target_type.as_str())
        .bind(vote.vote_type.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                LedgerRepositoryError::DuplicateVote { user_id: vote.user_id, target: vote.target }
            }
            other => other.into(),
        })?;
        Ok(())
    }

    async fn update_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError> {
        sqlx::query(
            r#"
            UPDATE votes
            SET vote_type = $4, updated_at = now()
            WHERE author_id = $1 AND action_id = $2 AND action_type = $3
            "#,
        )
        .bind(vote.user_id)
        .bind(vote.target.id)
        .bind(vote.target.target_type.as_str())
        .bind(vote.vote_type.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_user_vote(&mut self, user_id: UserId, target: TargetRef) -> Result<(), LedgerRepositoryError> {
        sqlx::query("DELETE FROM votes WHERE author_id = $1 AND action_id = $2 AND action_type = $3")
            .bind(user_id)
            .bind(target.id)
            .bind(target.target_type.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn increment_votes_count(
        &mut self,
        target: TargetRef,
        delta: CountDelta,
    ) -> Result<(), LedgerRepositoryError> {
        let column = delta.vote_type.counter_column();
        let sql = format!(
            "UPDATE {table} SET {column} = {column} + $1 WHERE id = $2",
            table = target.target_type.table(),
        );
        let result = sqlx::query(&sql)
            .bind(delta.change)
            .bind(target.id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerRepositoryError::TargetNotFound(target));
        }
        Ok(())
    }

    async fn increment_reputation(&mut self, user_id: UserId, points: i64) -> Result<(), LedgerRepositoryError> {
        let result = sqlx::query("UPDATE users SET reputation = reputation + $1 WHERE id = $2")
            .bind(points)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerRepositoryError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn find_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError> {
        let saved: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM collections WHERE author_id = $1 AND question_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(saved.is_some())
    }

    async fn insert_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError> {
        sqlx::query("INSERT INTO collections (author_id, question_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(question_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError> {
        sqlx::query("DELETE FROM collections WHERE author_id = $1 AND question_id = $2")
            .bind(user_id)
            .bind(question_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn claim_content_event(
        &mut self,
        action: InteractionAction,
        target: TargetRef,
    ) -> Result<bool, LedgerRepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO content_events (action, action_id, action_type)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(action.as_str())
        .bind(target.id)
        .bind(target.target_type.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn enqueue_interaction(
        &mut self,
        interaction: &NewInteraction,
    ) -> Result<OutboxId, LedgerRepositoryError> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO interaction_outbox (actor_id, action, action_id, action_type, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(interaction.actor_id)
        .bind(interaction.action.as_str())
        .bind(interaction.target.id)
        .bind(interaction.target.target_type.as_str())
        .bind(interaction.author_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerRepositoryError> {
        let PostgresLedgerTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
