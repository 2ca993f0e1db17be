//! Validation gate.
//!
//! Turns loosely-shaped operation parameters plus an optional actor id into
//! typed commands. Shape is checked first and every offending field is
//! reported at once; actor presence is checked after.
use std::str::FromStr;

use votes_ledger_shared::types::{
    CollectionParams, ContentEventParams, CreateVoteParams, FieldErrors, HasVotedParams, InteractionAction, RawId,
    TargetId, TargetRef, TargetType, UnknownVariant, UserId, VoteType,
};

use crate::errors::LedgerError;

/// A validated request to cast, flip or retract a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCommand {
    pub actor_id: UserId,
    pub target: TargetRef,
    pub vote_type: VoteType,
}

/// A validated read of the actor's vote on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteLookup {
    pub actor_id: UserId,
    pub target: TargetRef,
}

/// Content lifecycle actions that move reputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAction {
    Post,
    Delete,
}

impl From<ContentAction> for InteractionAction {
    fn from(action: ContentAction) -> Self {
        match action {
            ContentAction::Post => InteractionAction::Post,
            ContentAction::Delete => InteractionAction::Delete,
        }
    }
}

impl FromStr for ContentAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentAction::Post),
            "delete" => Ok(ContentAction::Delete),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A validated record of a question or answer being posted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentEventCommand {
    pub actor_id: UserId,
    pub action: ContentAction,
    pub target: TargetRef,
    pub author_id: UserId,
}

/// A validated collection operation on a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionCommand {
    pub actor_id: UserId,
    pub question_id: TargetId,
}

/// Accumulates per-field messages while individual fields are checked.
#[derive(Default)]
struct FieldValidator {
    errors: FieldErrors,
}

impl FieldValidator {
    fn reject(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_default().push(message);
    }

    /// Accepts a JSON integer or, as query strings deliver, its decimal text.
    fn positive_id(&mut self, field: &str, label: &str, value: Option<&RawId>) -> Option<i64> {
        let id = match value {
            None | Some(RawId::Null) => {
                self.reject(field, format!("{label} is required"));
                return None;
            }
            Some(RawId::Number(n)) => n.as_i64(),
            Some(RawId::String(raw)) => raw.trim().parse::<i64>().ok(),
            Some(_) => None,
        };
        match id {
            Some(id) if id > 0 => Some(id),
            _ => {
                self.reject(field, format!("{label} must be a positive integer"));
                None
            }
        }
    }

    fn one_of<T: FromStr>(&mut self, field: &str, label: &str, value: Option<&str>, expected: &[&str]) -> Option<T> {
        let Some(raw) = value else {
            self.reject(field, format!("{label} is required"));
            return None;
        };
        match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                let options = expected.iter().map(|o| format!("'{o}'")).collect::<Vec<_>>().join(" | ");
                self.reject(field, format!("Invalid enum value. Expected {options}, received '{raw}'"));
                None
            }
        }
    }

    fn into_error(self) -> LedgerError {
        LedgerError::Validation(self.errors)
    }
}

const TARGET_TYPES: &[&str] = &["question", "answer"];
const VOTE_TYPES: &[&str] = &["upvote", "downvote"];
const CONTENT_ACTIONS: &[&str] = &["post", "delete"];

fn require_actor(actor: Option<UserId>) -> Result<UserId, LedgerError> {
    actor.ok_or(LedgerError::Unauthorized)
}

fn check_target(
    validator: &mut FieldValidator,
    target_id: Option<&RawId>,
    target_type: Option<&str>,
) -> Option<TargetRef> {
    let id = validator.positive_id("targetId", "Target ID", target_id);
    let target_type = validator.one_of::<TargetType>("targetType", "Target type", target_type, TARGET_TYPES);
    Some(TargetRef { id: id?, target_type: target_type? })
}

pub fn validate_create_vote(actor: Option<UserId>, params: &CreateVoteParams) -> Result<VoteCommand, LedgerError> {
    let mut validator = FieldValidator::default();
    let target = check_target(&mut validator, params.target_id.as_ref(), params.target_type.as_deref());
    let vote_type = validator.one_of::<VoteType>("voteType", "Vote type", params.vote_type.as_deref(), VOTE_TYPES);

    let (Some(target), Some(vote_type)) = (target, vote_type) else {
        return Err(validator.into_error());
    };
    let actor_id = require_actor(actor)?;
    Ok(VoteCommand { actor_id, target, vote_type })
}

pub fn validate_has_voted(actor: Option<UserId>, params: &HasVotedParams) -> Result<VoteLookup, LedgerError> {
    let mut validator = FieldValidator::default();
    let Some(target) = check_target(&mut validator, params.target_id.as_ref(), params.target_type.as_deref()) else {
        return Err(validator.into_error());
    };
    let actor_id = require_actor(actor)?;
    Ok(VoteLookup { actor_id, target })
}

pub fn validate_content_event(
    actor: Option<UserId>,
    params: &ContentEventParams,
) -> Result<ContentEventCommand, LedgerError> {
    let mut validator = FieldValidator::default();
    let action = validator.one_of::<ContentAction>("action", "Action", params.action.as_deref(), CONTENT_ACTIONS);
    let target = check_target(&mut validator, params.target_id.as_ref(), params.target_type.as_deref());
    let author_id = validator.positive_id("authorId", "Author ID", params.author_id.as_ref());

    let (Some(action), Some(target), Some(author_id)) = (action, target, author_id) else {
        return Err(validator.into_error());
    };
    let actor_id = require_actor(actor)?;
    Ok(ContentEventCommand { actor_id, action, target, author_id })
}

pub fn validate_collection(actor: Option<UserId>, params: &CollectionParams) -> Result<CollectionCommand, LedgerError> {
    let mut validator = FieldValidator::default();
    let Some(question_id) = validator.positive_id("questionId", "Question ID", params.question_id.as_ref()) else {
        return Err(validator.into_error());
    };
    let actor_id = require_actor(actor)?;
    Ok(CollectionCommand { actor_id, question_id })
}
