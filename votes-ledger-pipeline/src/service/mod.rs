//! Ledger service.
//!
//! Runs the gate, then resolver, projector and accountant inside one
//! transaction, enqueues the interaction in that same transaction and wakes
//! the relay once it commits. Public operations return the uniform
//! [`ActionResponse`] envelope; the `apply_*` methods expose the typed results.
use std::sync::Arc;

use tracing::{debug, error, info};
use votes_ledger_repository::{InteractionLogRepository, LedgerRepository};
use votes_ledger_shared::types::{
    ActionResponse, CollectionParams, ContentEventParams, CreateVoteParams, FieldErrors, HasVotedParams,
    HasVotedResponse, InteractionAction, NewInteraction, OutboxId, SavedResponse, TargetRef, UserId, VoteTransition,
};

use crate::accountant::{self, ReputationChange};
use crate::errors::LedgerError;
use crate::gate::{self, CollectionCommand, ContentAction, ContentEventCommand, VoteCommand};
use crate::projector;
use crate::query::LedgerQuery;
use crate::relay::RelaySignal;
use crate::resolver;

/// Result of a committed vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub transition: VoteTransition,
    pub author_id: UserId,
    pub reputation_changes: Vec<ReputationChange>,
    pub outbox_id: OutboxId,
}

pub struct LedgerService {
    ledger: Arc<dyn LedgerRepository>,
    query: LedgerQuery,
    relay_signal: RelaySignal,
}

/// Like [`respond`], for operations whose success carries no data.
fn respond_done(operation: &'static str, result: Result<(), LedgerError>) -> ActionResponse<()> {
    match result {
        Ok(()) => ActionResponse::done(),
        Err(e) => respond(operation, Err(e)),
    }
}

fn respond<T>(operation: &'static str, result: Result<T, LedgerError>) -> ActionResponse<T> {
    match result {
        Ok(data) => ActionResponse::ok(data),
        Err(e) => {
            if e.is_internal() {
                error!(operation, error = %e, "Ledger operation failed");
            } else {
                debug!(operation, error = %e, "Ledger operation rejected");
            }
            ActionResponse::failure(e.to_error_body())
        }
    }
}

impl LedgerService {
    /// Creates a new `LedgerService`.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Transactional store for votes, counters, reputation and the outbox
    /// * `interactions` - Interaction log used by read-side queries
    /// * `relay_signal` - Wakes the interaction relay after each commit
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        interactions: Arc<dyn InteractionLogRepository>,
        relay_signal: RelaySignal,
    ) -> Self {
        let query = LedgerQuery::new(ledger.clone(), interactions);
        Self { ledger, query, relay_signal }
    }

    pub fn query(&self) -> &LedgerQuery {
        &self.query
    }

    /// Casts, flips or retracts the actor's vote on a target.
    pub async fn create_vote(&self, actor: Option<UserId>, params: &CreateVoteParams) -> ActionResponse<()> {
        let result = match gate::validate_create_vote(actor, params) {
            Ok(command) => self.apply_vote(&command).await.map(|_| ()),
            Err(e) => Err(e),
        };
        respond_done("create_vote", result)
    }

    /// Reports whether the actor has upvoted or downvoted a target.
    pub async fn has_voted(&self, actor: Option<UserId>, params: &HasVotedParams) -> ActionResponse<HasVotedResponse> {
        let result = match gate::validate_has_voted(actor, params) {
            Ok(lookup) => self.query.has_voted(lookup.actor_id, lookup.target).await,
            Err(e) => Err(e),
        };
        respond("has_voted", result)
    }

    /// Credits or debits the author of posted or deleted content.
    pub async fn record_content_event(&self, actor: Option<UserId>, params: &ContentEventParams) -> ActionResponse<()> {
        let result = match gate::validate_content_event(actor, params) {
            Ok(command) => self.apply_content_event(&command).await.map(|_| ()),
            Err(e) => Err(e),
        };
        respond_done("record_content_event", result)
    }

    /// Adds a question to the actor's collection, or removes it when already saved.
    pub async fn toggle_save_question(
        &self,
        actor: Option<UserId>,
        params: &CollectionParams,
    ) -> ActionResponse<SavedResponse> {
        let result = match gate::validate_collection(actor, params) {
            Ok(command) => self.apply_toggle_save(&command).await.map(|saved| SavedResponse { saved }),
            Err(e) => Err(e),
        };
        respond("toggle_save_question", result)
    }

    pub async fn has_saved_question(
        &self,
        actor: Option<UserId>,
        params: &CollectionParams,
    ) -> ActionResponse<SavedResponse> {
        let result = match gate::validate_collection(actor, params) {
            Ok(command) => self
                .query
                .has_saved_question(command.actor_id, command.question_id)
                .await
                .map(|saved| SavedResponse { saved }),
            Err(e) => Err(e),
        };
        respond("has_saved_question", result)
    }

    /// Applies a validated vote atomically.
    ///
    /// The vote row, both counters, both reputation increments and the outbox
    /// entry are written in one transaction. On any error the transaction is
    /// dropped uncommitted and nothing becomes visible.
    pub async fn apply_vote(&self, command: &VoteCommand) -> Result<VoteOutcome, LedgerError> {
        let mut tx = self.ledger.begin().await?;

        let resolved = resolver::resolve_vote(tx.as_mut(), command).await?;
        projector::project(tx.as_mut(), command.target, &resolved.transition).await?;

        let delta = accountant::transition_points(&resolved.transition, command.target.target_type);
        let reputation_changes = accountant::settle(tx.as_mut(), delta, command.actor_id, resolved.author_id).await?;

        let outbox_id = tx
            .enqueue_interaction(&NewInteraction {
                actor_id: command.actor_id,
                action: command.vote_type.into(),
                target: command.target,
                author_id: resolved.author_id,
            })
            .await?;

        tx.commit().await?;
        self.relay_signal.notify();

        info!(
            actor_id = command.actor_id,
            target = %command.target,
            transition = ?resolved.transition,
            "Vote committed"
        );

        Ok(VoteOutcome {
            transition: resolved.transition,
            author_id: resolved.author_id,
            reputation_changes,
            outbox_id,
        })
    }

    /// Applies the reputation effect of a posted or deleted question or answer.
    ///
    /// A posted target must exist and belong to the given author. A deleted
    /// target is usually gone already, so only the author is required. Each
    /// action is applied at most once per target; a replay changes nothing.
    pub async fn apply_content_event(
        &self,
        command: &ContentEventCommand,
    ) -> Result<Vec<ReputationChange>, LedgerError> {
        let mut tx = self.ledger.begin().await?;

        if command.action == ContentAction::Post {
            let author_id = tx
                .find_target_author(command.target)
                .await?
                .ok_or_else(|| LedgerError::NotFound(target_name(command.target)))?;
            if author_id != command.author_id {
                let mut fields = FieldErrors::new();
                fields.insert(
                    "authorId".to_string(),
                    vec!["Author ID does not match the content author".to_string()],
                );
                return Err(LedgerError::Validation(fields));
            }
        }

        let action: InteractionAction = command.action.into();
        if !tx.claim_content_event(action, command.target).await? {
            debug!(target = %command.target, action = %action, "Content event already recorded");
            return Ok(Vec::new());
        }

        let delta = accountant::points_for(action, command.target.target_type);
        let changes = accountant::settle(tx.as_mut(), delta, command.actor_id, command.author_id).await?;

        tx.enqueue_interaction(&NewInteraction {
            actor_id: command.actor_id,
            action,
            target: command.target,
            author_id: command.author_id,
        })
        .await?;

        tx.commit().await?;
        self.relay_signal.notify();

        info!(
            actor_id = command.actor_id,
            author_id = command.author_id,
            target = %command.target,
            action = %action,
            "Content event committed"
        );
        Ok(changes)
    }

    /// Toggles a question in the actor's collection and returns whether it is now saved.
    pub async fn apply_toggle_save(&self, command: &CollectionCommand) -> Result<bool, LedgerError> {
        let target = TargetRef::question(command.question_id);
        let mut tx = self.ledger.begin().await?;

        let author_id = tx
            .find_target_author(target)
            .await?
            .ok_or_else(|| LedgerError::NotFound(target_name(target)))?;

        let saved = if tx.find_saved_question(command.actor_id, command.question_id).await? {
            tx.delete_saved_question(command.actor_id, command.question_id).await?;
            false
        } else {
            tx.insert_saved_question(command.actor_id, command.question_id).await?;
            tx.enqueue_interaction(&NewInteraction {
                actor_id: command.actor_id,
                action: InteractionAction::Bookmark,
                target,
                author_id,
            })
            .await?;
            true
        };

        tx.commit().await?;
        if saved {
            self.relay_signal.notify();
        }

        debug!(actor_id = command.actor_id, question_id = command.question_id, saved, "Collection toggled");
        Ok(saved)
    }
}

fn target_name(target: TargetRef) -> String {
    crate::errors::ledger::entity_name(target.target_type).to_string()
}
