//! Error types for ledger operations.
//! Defines the failure taxonomy exposed to callers and its conversion into the
//! response envelope.
use thiserror::Error;
use votes_ledger_repository::{InteractionLogError, LedgerRepositoryError};
use votes_ledger_shared::types::{ErrorBody, ErrorKind, FieldErrors, TargetType};

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Represents errors that can occur while executing a ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing request fields.
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(FieldErrors),

    /// No authenticated actor for an operation requiring one.
    #[error("Unauthorized")]
    Unauthorized,

    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(LedgerRepositoryError),

    #[error("Interaction log error: {0}")]
    InteractionLog(#[from] InteractionLogError),
}

fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .values()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn entity_name(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Question => "Question",
        TargetType::Answer => "Answer",
    }
}

impl From<LedgerRepositoryError> for LedgerError {
    fn from(err: LedgerRepositoryError) -> Self {
        match err {
            LedgerRepositoryError::TargetNotFound(target) => {
                LedgerError::NotFound(entity_name(target.target_type).to_string())
            }
            LedgerRepositoryError::UserNotFound(_) => LedgerError::NotFound("User".to_string()),
            other => LedgerError::Repository(other),
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::Unauthorized => ErrorKind::Unauthorized,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Repository(_) | LedgerError::InteractionLog(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error stems from an unexpected storage failure.
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Converts the error into the body of a failure envelope.
    ///
    /// Internal failures are reported with a fixed message so that storage
    /// details never reach the caller.
    pub fn to_error_body(&self) -> ErrorBody {
        match self {
            LedgerError::Validation(field_errors) => ErrorBody {
                kind: ErrorKind::Validation,
                message: format_field_errors(field_errors),
                field_errors: Some(field_errors.clone()),
            },
            LedgerError::Repository(_) | LedgerError::InteractionLog(_) => ErrorBody {
                kind: ErrorKind::Internal,
                message: INTERNAL_MESSAGE.to_string(),
                field_errors: None,
            },
            other => ErrorBody {
                kind: other.kind(),
                message: other.to_string(),
                field_errors: None,
            },
        }
    }
}
