mod ids;
mod target;
mod vote;
mod votes_count;
mod transition;
mod interaction;
mod params;
mod response;

pub use ids::{InteractionId, OutboxId, TargetId, UserId};
pub use target::{TargetRef, TargetType};
pub use vote::{UserVote, VoteType};
pub use votes_count::{CountDelta, VotesCount};
pub use transition::VoteTransition;
pub use interaction::{Interaction, InteractionAction, NewInteraction, OutboxEntry};
pub use params::{CollectionParams, ContentEventParams, CreateVoteParams, HasVotedParams, RawId};
pub use response::{ActionResponse, ErrorBody, ErrorKind, FieldErrors, HasVotedResponse, SavedResponse};

/// Error returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);
