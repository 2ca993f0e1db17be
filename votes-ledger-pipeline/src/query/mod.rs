//! Read-side queries used to hydrate UI state.
//!
//! Pure reads with no side effects; safe to call concurrently and repeatedly.
use std::sync::Arc;

use votes_ledger_repository::{InteractionLogRepository, LedgerRepository};
use votes_ledger_shared::types::{HasVotedResponse, Interaction, TargetId, TargetRef, UserId, VoteType, VotesCount};

use crate::errors::{LedgerError, ledger::entity_name};

pub struct LedgerQuery {
    ledger: Arc<dyn LedgerRepository>,
    interactions: Arc<dyn InteractionLogRepository>,
}

impl LedgerQuery {
    pub fn new(ledger: Arc<dyn LedgerRepository>, interactions: Arc<dyn InteractionLogRepository>) -> Self {
        Self { ledger, interactions }
    }

    /// Reports how the actor currently votes on the target; both flags are
    /// false when there is no vote.
    pub async fn has_voted(&self, actor_id: UserId, target: TargetRef) -> Result<HasVotedResponse, LedgerError> {
        let vote = self.ledger.get_user_vote(actor_id, target).await?;
        Ok(HasVotedResponse {
            has_upvoted: vote == Some(VoteType::Upvote),
            has_downvoted: vote == Some(VoteType::Downvote),
        })
    }

    pub async fn votes_count(&self, target: TargetRef) -> Result<VotesCount, LedgerError> {
        self.ledger
            .get_votes_count(target)
            .await?
            .ok_or_else(|| LedgerError::NotFound(entity_name(target.target_type).to_string()))
    }

    pub async fn reputation(&self, user_id: UserId) -> Result<i64, LedgerError> {
        self.ledger
            .get_reputation(user_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound("User".to_string()))
    }

    pub async fn has_saved_question(&self, actor_id: UserId, question_id: TargetId) -> Result<bool, LedgerError> {
        Ok(self.ledger.has_saved_question(actor_id, question_id).await?)
    }

    /// Most recent delivered interactions of a user, newest first.
    pub async fn interactions_for_user(&self, user_id: UserId, limit: i64) -> Result<Vec<Interaction>, LedgerError> {
        Ok(self.interactions.get_user_interactions(user_id, limit).await?)
    }
}
