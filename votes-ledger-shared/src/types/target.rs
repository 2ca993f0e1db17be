use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{TargetId, UnknownVariant};

/// The kind of content that can receive votes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Question,
    Answer,
}

impl TargetType {
    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Question => "question",
            TargetType::Answer => "answer",
        }
    }

    /// Table holding rows of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            TargetType::Question => "questions",
            TargetType::Answer => "answers",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(TargetType::Question),
            "answer" => Ok(TargetType::Answer),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Identifies a single question or answer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub id: TargetId,
    pub target_type: TargetType,
}

impl TargetRef {
    pub fn question(id: TargetId) -> Self {
        Self { id, target_type: TargetType::Question }
    }

    pub fn answer(id: TargetId) -> Self {
        Self { id, target_type: TargetType::Answer }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target_type, self.id)
    }
}
