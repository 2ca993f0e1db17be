use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use votes_ledger_shared::types::{
    CountDelta, Interaction, InteractionAction, NewInteraction, OutboxEntry, OutboxId, TargetId, TargetRef, UserId, UserVote,
    VoteType, VotesCount,
};

use crate::{
    InteractionLogError, InteractionLogRepository, LedgerRepository, LedgerRepositoryError, LedgerTransaction,
};

#[derive(Debug, Clone)]
struct TargetRow {
    author_id: UserId,
    upvotes: i64,
    downvotes: i64,
}

#[derive(Debug, Clone)]
struct OutboxRow {
    entry: OutboxEntry,
    delivered: bool,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Faults {
    reputation_users: HashSet<UserId>,
    deliveries: bool,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    users: HashMap<UserId, i64>,
    targets: HashMap<TargetRef, TargetRow>,
    votes: HashMap<(UserId, TargetRef), VoteType>,
    collections: HashSet<(UserId, TargetId)>,
    content_events: HashSet<(InteractionAction, TargetRef)>,
    outbox: BTreeMap<OutboxId, OutboxRow>,
    interactions: Vec<Interaction>,
    next_outbox_id: OutboxId,
    next_interaction_id: i64,
    faults: Faults,
}

/// Process-local ledger store backed by a single mutex.
#[derive(Clone, Default)]
pub struct InMemoryLedgerRepository {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user with the given reputation.
    pub async fn insert_user(&self, user_id: UserId, reputation: i64) {
        self.state.lock().await.users.insert(user_id, reputation);
    }

    /// Inserts a question authored by `author_id` with zeroed counters.
    pub async fn insert_question(&self, id: TargetId, author_id: UserId) {
        self.insert_target(TargetRef::question(id), author_id).await;
    }

    /// Inserts an answer authored by `author_id` with zeroed counters.
    pub async fn insert_answer(&self, id: TargetId, author_id: UserId) {
        self.insert_target(TargetRef::answer(id), author_id).await;
    }

    async fn insert_target(&self, target: TargetRef, author_id: UserId) {
        self.state
            .lock()
            .await
            .targets
            .insert(target, TargetRow { author_id, upvotes: 0, downvotes: 0 });
    }

    /// Makes every reputation increment for `user_id` fail until faults are cleared.
    pub async fn fail_reputation_updates_for(&self, user_id: UserId) {
        self.state.lock().await.faults.reputation_users.insert(user_id);
    }

    /// Makes every interaction delivery fail until faults are cleared.
    pub async fn fail_deliveries(&self) {
        self.state.lock().await.faults.deliveries = true;
    }

    pub async fn clear_faults(&self) {
        self.state.lock().await.faults = Faults::default();
    }

    /// Counts live vote rows on a target, grouped as (upvotes, downvotes).
    pub async fn count_vote_rows(&self, target: TargetRef) -> (i64, i64) {
        let state = self.state.lock().await;
        state
            .votes
            .iter()
            .filter(|((_, t), _)| *t == target)
            .fold((0, 0), |(up, down), (_, vote_type)| match vote_type {
                VoteType::Upvote => (up + 1, down),
                VoteType::Downvote => (up, down + 1),
            })
    }

    /// Last recorded delivery error of an outbox entry.
    pub async fn last_delivery_error(&self, id: OutboxId) -> Option<String> {
        self.state.lock().await.outbox.get(&id).and_then(|row| row.last_error.clone())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerRepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryLedgerTransaction { guard, working }))
    }

    async fn get_user_vote(
        &self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError> {
        Ok(self.state.lock().await.votes.get(&(user_id, target)).copied())
    }

    async fn get_votes_count(&self, target: TargetRef) -> Result<Option<VotesCount>, LedgerRepositoryError> {
        Ok(self.state.lock().await.targets.get(&target).map(|row| VotesCount {
            target,
            upvotes: row.upvotes,
            downvotes: row.downvotes,
        }))
    }

    async fn get_reputation(&self, user_id: UserId) -> Result<Option<i64>, LedgerRepositoryError> {
        Ok(self.state.lock().await.users.get(&user_id).copied())
    }

    async fn has_saved_question(
        &self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError> {
        Ok(self.state.lock().await.collections.contains(&(user_id, question_id)))
    }
}

/// A transaction over [`InMemoryLedgerRepository`].
///
/// Holds the store lock for its whole lifetime.
pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn find_target_author(&mut self, target: TargetRef) -> Result<Option<UserId>, LedgerRepositoryError> {
        Ok(self.working.targets.get(&target).map(|row| row.author_id))
    }

    async fn find_user_vote(
        &mut self,
        user_id: UserId,
        target: TargetRef,
    ) -> Result<Option<VoteType>, LedgerRepositoryError> {
        Ok(self.working.votes.get(&(user_id, target)).copied())
    }

    async fn insert_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError> {
        let key = (vote.user_id, vote.target);
        if self.working.votes.contains_key(&key) {
            return Err(LedgerRepositoryError::DuplicateVote { user_id: vote.user_id, target: vote.target });
        }
        self.working.votes.insert(key, vote.vote_type);
        Ok(())
    }

    async fn update_user_vote(&mut self, vote: &UserVote) -> Result<(), LedgerRepositoryError> {
        if let Some(existing) = self.working.votes.get_mut(&(vote.user_id, vote.target)) {
            *existing = vote.vote_type;
        }
        Ok(())
    }

    async fn delete_user_vote(&mut self, user_id: UserId, target: TargetRef) -> Result<(), LedgerRepositoryError> {
        self.working.votes.remove(&(user_id, target));
        Ok(())
    }

    async fn increment_votes_count(
        &mut self,
        target: TargetRef,
        delta: CountDelta,
    ) -> Result<(), LedgerRepositoryError> {
        let row = self
            .working
            .targets
            .get_mut(&target)
            .ok_or(LedgerRepositoryError::TargetNotFound(target))?;
        match delta.vote_type {
            VoteType::Upvote => row.upvotes += delta.change,
            VoteType::Downvote => row.downvotes += delta.change,
        }
        Ok(())
    }

    async fn increment_reputation(&mut self, user_id: UserId, points: i64) -> Result<(), LedgerRepositoryError> {
        if self.working.faults.reputation_users.contains(&user_id) {
            return Err(LedgerRepositoryError::Unavailable(format!(
                "reputation update rejected for user {user_id}"
            )));
        }
        let reputation = self
            .working
            .users
            .get_mut(&user_id)
            .ok_or(LedgerRepositoryError::UserNotFound(user_id))?;
        *reputation += points;
        Ok(())
    }

    async fn find_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<bool, LedgerRepositoryError> {
        Ok(self.working.collections.contains(&(user_id, question_id)))
    }

    async fn insert_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError> {
        self.working.collections.insert((user_id, question_id));
        Ok(())
    }

    async fn delete_saved_question(
        &mut self,
        user_id: UserId,
        question_id: TargetId,
    ) -> Result<(), LedgerRepositoryError> {
        self.working.collections.remove(&(user_id, question_id));
        Ok(())
    }

    async fn claim_content_event(
        &mut self,
        action: InteractionAction,
        target: TargetRef,
    ) -> Result<bool, LedgerRepositoryError> {
        Ok(self.working.content_events.insert((action, target)))
    }

    async fn enqueue_interaction(
        &mut self,
        interaction: &NewInteraction,
    ) -> Result<OutboxId, LedgerRepositoryError> {
        self.working.next_outbox_id += 1;
        let id = self.working.next_outbox_id;
        self.working.outbox.insert(
            id,
            OutboxRow {
                entry: OutboxEntry {
                    id,
                    interaction: *interaction,
                    attempts: 0,
                    enqueued_at: OffsetDateTime::now_utc(),
                },
                delivered: false,
                last_error: None,
            },
        );
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerRepositoryError> {
        let InMemoryLedgerTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl InteractionLogRepository for InMemoryLedgerRepository {
    async fn get_pending_interactions(&self, limit: i64) -> Result<Vec<OutboxEntry>, InteractionLogError> {
        let state = self.state.lock().await;
        Ok(state
            .outbox
            .values()
            .filter(|row| !row.delivered)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|row| row.entry.clone())
            .collect())
    }

    async fn deliver_interaction(&self, entry: &OutboxEntry) -> Result<Interaction, InteractionLogError> {
        let mut state = self.state.lock().await;
        if state.faults.deliveries {
            return Err(InteractionLogError::Unavailable("interaction log rejected write".to_string()));
        }
        if let Some(existing) = state.interactions.iter().find(|i| i.outbox_id == entry.id) {
            return Ok(existing.clone());
        }
        if !state.outbox.contains_key(&entry.id) {
            return Err(InteractionLogError::OutboxEntryNotFound(entry.id));
        }

        state.next_interaction_id += 1;
        let interaction = Interaction {
            id: state.next_interaction_id,
            outbox_id: entry.id,
            actor_id: entry.interaction.actor_id,
            action: entry.interaction.action,
            target: entry.interaction.target,
            created_at: entry.enqueued_at,
        };
        state.interactions.push(interaction.clone());
        if let Some(row) = state.outbox.get_mut(&entry.id) {
            row.delivered = true;
            row.entry.attempts += 1;
        }
        Ok(interaction)
    }

    async fn record_delivery_failure(&self, id: OutboxId, reason: &str) -> Result<(), InteractionLogError> {
        let mut state = self.state.lock().await;
        let row = state.outbox.get_mut(&id).ok_or(InteractionLogError::OutboxEntryNotFound(id))?;
        row.entry.attempts += 1;
        row.last_error = Some(reason.to_string());
        Ok(())
    }

    async fn get_user_interactions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Interaction>, InteractionLogError> {
        let state = self.state.lock().await;
        Ok(state
            .interactions
            .iter()
            .rev()
            .filter(|i| i.actor_id == user_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
