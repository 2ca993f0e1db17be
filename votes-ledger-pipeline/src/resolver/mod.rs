//! Vote state resolver.
//!
//! Decides which transition a vote request causes for a (user, target) pair and
//! applies the matching mutation to the vote row.
use tracing::debug;
use votes_ledger_repository::LedgerTransaction;
use votes_ledger_shared::types::{UserId, UserVote, VoteTransition, VoteType};

use crate::errors::{LedgerError, ledger::entity_name};
use crate::gate::VoteCommand;

/// Maps the current vote (if any) and the requested vote type to a transition.
pub fn resolve(existing: Option<VoteType>, requested: VoteType) -> VoteTransition {
    match existing {
        None => VoteTransition::Create(requested),
        Some(current) if current == requested => VoteTransition::ToggleOff(requested),
        Some(current) => VoteTransition::Flip { from: current, to: requested },
    }
}

/// Outcome of resolving a vote inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVote {
    /// Author of the voted content.
    pub author_id: UserId,
    pub transition: VoteTransition,
}

/// Locks the target, resolves the transition and writes the vote row.
///
/// # Errors
///
/// `NotFound` when the target does not exist; repository failures otherwise.
pub async fn resolve_vote(
    tx: &mut dyn LedgerTransaction,
    command: &VoteCommand,
) -> Result<ResolvedVote, LedgerError> {
    let author_id = tx
        .find_target_author(command.target)
        .await?
        .ok_or_else(|| LedgerError::NotFound(entity_name(command.target.target_type).to_string()))?;

    let existing = tx.find_user_vote(command.actor_id, command.target).await?;
    let transition = resolve(existing, command.vote_type);
    debug!(
        actor_id = command.actor_id,
        target = %command.target,
        ?transition,
        "Resolved vote transition"
    );

    let vote = UserVote {
        user_id: command.actor_id,
        target: command.target,
        vote_type: command.vote_type,
    };
    match transition {
        VoteTransition::Create(_) => tx.insert_user_vote(&vote).await?,
        VoteTransition::ToggleOff(_) => tx.delete_user_vote(command.actor_id, command.target).await?,
        VoteTransition::Flip { .. } => tx.update_user_vote(&vote).await?,
    }

    Ok(ResolvedVote { author_id, transition })
}
