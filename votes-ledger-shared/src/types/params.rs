//! Operation parameters as received from the presentation layer.
//!
//! Every field is optional on the wire so that absent values can be reported
//! per field instead of failing deserialization of the whole request. Ids are
//! kept as raw JSON values for the same reason: a string or fractional id is a
//! field error, not a malformed body.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An id as received, before it is checked to be a positive integer.
pub type RawId = Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoteParams {
    pub target_id: Option<RawId>,
    pub target_type: Option<String>,
    pub vote_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedParams {
    pub target_id: Option<RawId>,
    pub target_type: Option<String>,
}

/// Records a question or answer being posted or deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentEventParams {
    pub action: Option<String>,
    pub target_id: Option<RawId>,
    pub target_type: Option<String>,
    pub author_id: Option<RawId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionParams {
    pub question_id: Option<RawId>,
}
