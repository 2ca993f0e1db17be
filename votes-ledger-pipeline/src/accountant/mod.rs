//! Reputation accountant.
//!
//! Maps community actions to reputation point deltas for the acting user and
//! the content author and applies them inside the ledger transaction.
//!
//! | action   | actor | author |
//! |----------|------:|-------:|
//! | upvote   |    +2 |    +10 |
//! | downvote |    -1 |     -2 |
//! | post     |     0 | +5 question / +10 answer |
//! | delete   |     0 | -5 question / -10 answer |
use std::ops::{Add, Neg};

use votes_ledger_repository::LedgerTransaction;
use votes_ledger_shared::types::{InteractionAction, TargetType, UserId, VoteTransition, VoteType};

use crate::errors::LedgerError;

/// Reputation points owed to the actor and to the content author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReputationDelta {
    pub actor: i64,
    pub author: i64,
}

impl Add for ReputationDelta {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { actor: self.actor + other.actor, author: self.author + other.author }
    }
}

impl Neg for ReputationDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self { actor: -self.actor, author: -self.author }
    }
}

/// A single reputation increment on one user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationChange {
    pub user_id: UserId,
    pub points: i64,
}

/// Looks up the point table.
pub fn points_for(action: InteractionAction, target_type: TargetType) -> ReputationDelta {
    match (action, target_type) {
        (InteractionAction::Upvote, _) => ReputationDelta { actor: 2, author: 10 },
        (InteractionAction::Downvote, _) => ReputationDelta { actor: -1, author: -2 },
        (InteractionAction::Post, TargetType::Question) => ReputationDelta { actor: 0, author: 5 },
        (InteractionAction::Post, TargetType::Answer) => ReputationDelta { actor: 0, author: 10 },
        (InteractionAction::Delete, TargetType::Question) => ReputationDelta { actor: 0, author: -5 },
        (InteractionAction::Delete, TargetType::Answer) => ReputationDelta { actor: 0, author: -10 },
        _ => ReputationDelta::default(),
    }
}

fn vote_points(vote_type: VoteType, target_type: TargetType) -> ReputationDelta {
    points_for(vote_type.into(), target_type)
}

/// Net delta of a vote transition.
///
/// Retracting a vote reverses the points it granted, so reputation always
/// reflects the set of live votes.
pub fn transition_points(transition: &VoteTransition, target_type: TargetType) -> ReputationDelta {
    match *transition {
        VoteTransition::Create(vote_type) => vote_points(vote_type, target_type),
        VoteTransition::ToggleOff(vote_type) => -vote_points(vote_type, target_type),
        VoteTransition::Flip { from, to } => -vote_points(from, target_type) + vote_points(to, target_type),
    }
}

/// Splits a delta into per-user increments, ordered by user id.
///
/// When the actor is the author only the author delta is applied, once.
/// Every transaction locks user rows in ascending id order, so two opposite
/// cross votes cannot wait on each other.
pub fn plan_changes(delta: ReputationDelta, actor_id: UserId, author_id: UserId) -> Vec<ReputationChange> {
    if actor_id == author_id {
        return vec![ReputationChange { user_id: author_id, points: delta.author }];
    }
    let mut changes = vec![
        ReputationChange { user_id: actor_id, points: delta.actor },
        ReputationChange { user_id: author_id, points: delta.author },
    ];
    changes.sort_by_key(|change| change.user_id);
    changes
}

/// Applies `delta` for the given actor and author and returns the increments made.
///
/// Any failed increment aborts with an error; the caller's transaction is then
/// dropped, rolling back every other change made in it.
pub async fn settle(
    tx: &mut dyn LedgerTransaction,
    delta: ReputationDelta,
    actor_id: UserId,
    author_id: UserId,
) -> Result<Vec<ReputationChange>, LedgerError> {
    let changes = plan_changes(delta, actor_id, author_id);
    for change in &changes {
        tx.increment_reputation(change.user_id, change.points).await?;
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_table() {
        assert_eq!(points_for(InteractionAction::Upvote, TargetType::Answer), ReputationDelta { actor: 2, author: 10 });
        assert_eq!(points_for(InteractionAction::Downvote, TargetType::Question), ReputationDelta { actor: -1, author: -2 });
        assert_eq!(points_for(InteractionAction::Post, TargetType::Question).author, 5);
        assert_eq!(points_for(InteractionAction::Post, TargetType::Answer).author, 10);
        assert_eq!(points_for(InteractionAction::Delete, TargetType::Question).author, -5);
        assert_eq!(points_for(InteractionAction::Delete, TargetType::Answer).author, -10);
        assert_eq!(points_for(InteractionAction::Bookmark, TargetType::Question), ReputationDelta::default());
    }

    #[test]
    fn test_self_action_collapses_to_author_delta() {
        let changes = plan_changes(ReputationDelta { actor: 2, author: 10 }, 7, 7);
        assert_eq!(changes, vec![ReputationChange { user_id: 7, points: 10 }]);
    }

    #[test]
    fn test_distinct_users_get_both_deltas() {
        let changes = plan_changes(ReputationDelta { actor: -1, author: -2 }, 1, 2);
        assert_eq!(changes, vec![
            ReputationChange { user_id: 1, points: -1 },
            ReputationChange { user_id: 2, points: -2 },
        ]);
    }

    #[test]
    fn test_changes_lock_users_in_id_order() {
        let delta = ReputationDelta { actor: 2, author: 10 };
        let forward = plan_changes(delta, 3, 8);
        let reverse = plan_changes(delta, 8, 3);

        assert_eq!(forward.iter().map(|c| c.user_id).collect::<Vec<_>>(), vec![3, 8]);
        assert_eq!(reverse.iter().map(|c| c.user_id).collect::<Vec<_>>(), vec![3, 8]);
        assert_eq!(reverse, vec![
            ReputationChange { user_id: 3, points: 10 },
            ReputationChange { user_id: 8, points: 2 },
        ]);
    }

    #[test]
    fn test_transition_points_reverse_on_toggle_off() {
        let created = transition_points(&VoteTransition::Create(VoteType::Upvote), TargetType::Question);
        let removed = transition_points(&VoteTransition::ToggleOff(VoteType::Upvote), TargetType::Question);
        assert_eq!(created + removed, ReputationDelta::default());
    }

    #[test]
    fn test_flip_points() {
        let flipped = transition_points(
            &VoteTransition::Flip { from: VoteType::Upvote, to: VoteType::Downvote },
            TargetType::Answer,
        );
        assert_eq!(flipped, ReputationDelta { actor: -3, author: -12 });
    }
}
