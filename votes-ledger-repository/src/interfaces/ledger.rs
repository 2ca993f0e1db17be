//! This module defines the `LedgerRepository` and `LedgerTransaction` traits,
//! which provide an interface for the transactional side of the ledger: vote rows,
//! target counters, user reputation, collections and the interaction outbox.
use votes_ledger_shared::types::{
    CountDelta, InteractionAction, NewInteraction, OutboxId, TargetId, TargetRef, UserId, UserVote, VoteType, VotesCount,
};

use crate::errors::LedgerRepositoryError;

/// Entry point to the ledger data store.
///
/// Mutations only happen through a [`LedgerTransaction`] obtained from
/// [`LedgerRepository::begin`]; the remaining methods are plain reads.
#[async_trait::async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Opens a new transaction.
    ///
    /// # Returns
    ///
    /// A boxed transaction, or a `LedgerRepositoryError` if the store cannot start one.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerRepositoryError>;

    /// Retrieves the live vote of a user on a target, if any.
    async fn get_user_vote(
        &self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError>;

    /// Retrieves the denormalized counters of a target, `None` when the target is absent.
    async fn get_votes_count(&self, target: TargetRef) -> Result<Option<VotesCount>, LedgerRepositoryError>;

    /// Retrieves the reputation of a user, `None` when the user is absent.
    async fn get_reputation(&self, user_id: UserId) -> Result<Option<i64>, LedgerRepositoryError>;

    /// Checks whether a user has a question in their collection.
    async fn has_saved_question(
        &self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError>;
}

/// A unit of work over the ledger.
///
/// Dropping a transaction without calling [`LedgerTransaction::commit`] rolls back
/// every change made through it, including enqueued interactions.
#[async_trait::async_trait]
pub trait LedgerTransaction: Send {
    /// Returns the author of a target and locks the target row until the
    /// transaction ends. `None` when the target does not exist.
    async fn find_target_author(&mut self, target: TargetRef) -> Result<Option<UserId>, LedgerRepositoryError>;

    async fn find_user_vote(
        &mut self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError>;

    async fn insert_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError>;

    async fn update_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError>;

    async fn delete_user_vote(&mut self, user_id: UserId, target: TargetRef) -> Result<(), LedgerRepositoryError>;

    /// Atomically adds `delta.change` to one counter of the target.
    ///
    /// # Errors
    ///
    /// `TargetNotFound` when no row was updated.
    async fn increment_votes_count(
        &mut self,
        target: TargetRef,
        delta: CountDelta,
    ) -> Result<(), LedgerRepositoryError>;

    /// Atomically adds `points` to the reputation of a user.
    ///
    /// # Errors
    ///
    /// `UserNotFound` when no row was updated.
    async fn increment_reputation(&mut self, user_id: UserId, points: i64) -> Result<(), LedgerRepositoryError>;

    async fn find_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError>;

    async fn insert_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError>;

    async fn delete_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError>;

    /// Records that `action` happened to `target`.
    ///
    /// Returns `false` when it was already recorded, so a replayed content
    /// event is applied once.
    async fn claim_content_event(
        &mut self,
        action: InteractionAction,
        target: TargetRef,
    ) -> Result<bool, LedgerRepositoryError>;

    /// Writes an interaction to the outbox as part of this transaction.
    async fn enqueue_interaction(
        &mut self,
        interaction: &NewInteraction,
    ) -> Result<OutboxId, LedgerRepositoryError>;

    /// Commits every change made through this transaction.
    async fn commit(self: Box<Self>) -> Result<(), LedgerRepositoryError>;
}
