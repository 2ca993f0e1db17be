//! Vote count projector.
//!
//! Applies the counter deltas of a vote transition to the target row through
//! in-place increments.
use votes_ledger_repository::LedgerTransaction;
use votes_ledger_shared::types::{TargetRef, VoteTransition};

use crate::errors::LedgerError;

/// Applies every counter delta implied by `transition` to `target`.
pub async fn project(
    tx: &mut dyn LedgerTransaction,
    target: TargetRef,
    transition: &VoteTransition,
) -> Result<(), LedgerError> {
    for delta in transition.count_deltas() {
        tx.increment_votes_count(target, delta).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_ledger_repository::{InMemoryLedgerRepository, LedgerRepository};
    use votes_ledger_shared::types::VoteType;

    #[tokio::test]
    async fn test_flip_after_create() {
        let repository = InMemoryLedgerRepository::new();
        repository.insert_answer(8, 1).await;
        let target = TargetRef::answer(8);

        let mut tx = repository.begin().await.unwrap();
        project(tx.as_mut(), target, &VoteTransition::Create(VoteType::Upvote)).await.unwrap();
        project(tx.as_mut(), target, &VoteTransition::Flip { from: VoteType::Upvote, to: VoteType::Downvote })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let counts = repository.get_votes_count(target).await.unwrap().unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (0, 1));
    }

    #[tokio::test]
    async fn test_missing_target_fails() {
        let repository = InMemoryLedgerRepository::new();
        let mut tx = repository.begin().await.unwrap();
        let err = project(tx.as_mut(), TargetRef::question(1), &VoteTransition::Create(VoteType::Upvote))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
