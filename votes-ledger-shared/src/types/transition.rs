use crate::types::{CountDelta, VoteType};

/// The state change a vote request causes on the (user, target) vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No vote existed; one of the requested type is inserted.
    Create(VoteType),
    /// A vote of the requested type existed; it is removed.
    ToggleOff(VoteType),
    /// A vote of the opposite type existed; it is switched.
    Flip { from: VoteType, to: VoteType },
}

impl VoteTransition {
    /// Net counter changes implied by this transition.
    pub fn count_deltas(&self) -> Vec<CountDelta> {
        match *self {
            VoteTransition::Create(vote_type) => vec![CountDelta { vote_type, change: 1 }],
            VoteTransition::ToggleOff(vote_type) => vec![CountDelta { vote_type, change: -1 }],
            VoteTransition::Flip { from, to } => vec![
                CountDelta { vote_type: from, change: -1 },
                CountDelta { vote_type: to, change: 1 },
            ],
        }
    }
}
