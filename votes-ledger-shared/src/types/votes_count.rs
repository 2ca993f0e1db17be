use serde::{Deserialize, Serialize};

use crate::types::{TargetRef, VoteType};

/// Represents the denormalized vote counters of a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesCount {
    pub target: TargetRef,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    pub fn total(&self) -> i64 {
        self.upvotes + self.downvotes
    }
}

/// A signed change to exactly one counter of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountDelta {
    pub vote_type: VoteType,
    pub change: i64,
}
