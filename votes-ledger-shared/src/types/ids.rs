/// Primary key of a user row.
pub type UserId = i64;
/// Primary key of a question or answer row.
pub type TargetId = i64;
/// Primary key of an interaction log row.
pub type InteractionId = i64;
/// Primary key of an interaction outbox row.
pub type OutboxId = i64;
