use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{InteractionId, OutboxId, TargetRef, UnknownVariant, UserId, VoteType};

/// The kind of community action recorded in the interaction log.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    View,
    Upvote,
    Downvote,
    Bookmark,
    Post,
    Edit,
    Delete,
    Search,
}

impl InteractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionAction::View => "view",
            InteractionAction::Upvote => "upvote",
            InteractionAction::Downvote => "downvote",
            InteractionAction::Bookmark => "bookmark",
            InteractionAction::Post => "post",
            InteractionAction::Edit => "edit",
            InteractionAction::Delete => "delete",
            InteractionAction::Search => "search",
        }
    }
}

impl From<VoteType> for InteractionAction {
    fn from(vote_type: VoteType) -> Self {
        match vote_type {
            VoteType::Upvote => InteractionAction::Upvote,
            VoteType::Downvote => InteractionAction::Downvote,
        }
    }
}

impl fmt::Display for InteractionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "view" => InteractionAction::View,
            "upvote" => InteractionAction::Upvote,
            "downvote" => InteractionAction::Downvote,
            "bookmark" => InteractionAction::Bookmark,
            "post" => InteractionAction::Post,
            "edit" => InteractionAction::Edit,
            "delete" => InteractionAction::Delete,
            "search" => InteractionAction::Search,
            other => return Err(UnknownVariant(other.to_string())),
        })
    }
}

/// An interaction waiting to be written to the log.
///
/// Produced inside a ledger transaction and stored in the outbox so that it
/// only becomes visible once that transaction commits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewInteraction {
    pub actor_id: UserId,
    pub action: InteractionAction,
    pub target: TargetRef,
    /// Owner of the content the action was performed on.
    pub author_id: UserId,
}

/// An undelivered outbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub id: OutboxId,
    pub interaction: NewInteraction,
    pub attempts: i32,
    pub enqueued_at: OffsetDateTime,
}

/// An immutable interaction log record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    pub id: InteractionId,
    pub outbox_id: OutboxId,
    pub actor_id: UserId,
    pub action: InteractionAction,
    pub target: TargetRef,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
