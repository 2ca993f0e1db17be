use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{TargetRef, UnknownVariant, UserId};

/// Represents the type of vote cast by a user.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    /// Indicates an upvote or positive endorsement.
    Upvote,
    /// Indicates a downvote or negative endorsement.
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }

    /// Name of the denormalized counter column this vote type feeds.
    pub fn counter_column(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvotes",
            VoteType::Downvote => "downvotes",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Represents a user's live vote on a target.
///
/// At most one exists per (user, target id, target type).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserVote {
    pub user_id: UserId,
    pub target: TargetRef,
    pub vote_type: VoteType,
}
