//! End-to-end behaviour of the vote and reputation ledger over the in-memory repository.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use votes_ledger_pipeline::relay::RelayConfig;
use votes_ledger_pipeline::{InteractionRelay, LedgerService};
use votes_ledger_repository::{InMemoryLedgerRepository, InteractionLogRepository, LedgerRepository};
use votes_ledger_shared::types::{
    CollectionParams, ContentEventParams, CreateVoteParams, ErrorKind, HasVotedParams, HasVotedResponse,
    InteractionAction, TargetRef, VoteType,
};

const ALICE: i64 = 1;
const BOB: i64 = 2;
const QUESTION: i64 = 100;
const ANSWER: i64 = 200;

struct Fixture {
    repository: InMemoryLedgerRepository,
    service: Arc<LedgerService>,
    relay: InteractionRelay,
}

async fn fixture() -> Fixture {
    let repository = InMemoryLedgerRepository::new();
    repository.insert_user(ALICE, 0).await;
    repository.insert_user(BOB, 0).await;
    repository.insert_question(QUESTION, BOB).await;
    repository.insert_answer(ANSWER, ALICE).await;

    let relay = InteractionRelay::new(
        Arc::new(repository.clone()),
        RelayConfig { batch_size: 50, poll_interval: Duration::from_secs(3600) },
    );
    let service = Arc::new(LedgerService::new(
        Arc::new(repository.clone()),
        Arc::new(repository.clone()),
        relay.signal(),
    ));
    Fixture { repository, service, relay }
}

fn vote(target_id: i64, target_type: &str, vote_type: &str) -> CreateVoteParams {
    CreateVoteParams {
        target_id: Some(target_id.into()),
        target_type: Some(target_type.to_string()),
        vote_type: Some(vote_type.to_string()),
    }
}

fn lookup(target_id: i64, target_type: &str) -> HasVotedParams {
    HasVotedParams { target_id: Some(target_id.into()), target_type: Some(target_type.to_string()) }
}

async fn counts(repository: &InMemoryLedgerRepository, target: TargetRef) -> (i64, i64) {
    let counts = repository.get_votes_count(target).await.unwrap().unwrap();
    (counts.upvotes, counts.downvotes)
}

async fn reputation(repository: &InMemoryLedgerRepository, user_id: i64) -> i64 {
    repository.get_reputation(user_id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_upvote_question_by_another_user() {
    let f = fixture().await;

    let response = f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    assert!(response.success, "{response:?}");

    let target = TargetRef::question(QUESTION);
    assert_eq!(f.repository.get_user_vote(ALICE, target).await.unwrap(), Some(VoteType::Upvote));
    assert_eq!(counts(&f.repository, target).await, (1, 0));
    assert_eq!(reputation(&f.repository, ALICE).await, 2);
    assert_eq!(reputation(&f.repository, BOB).await, 10);

    let status = f.service.has_voted(Some(ALICE), &lookup(QUESTION, "question")).await;
    assert_eq!(status.data, Some(HasVotedResponse { has_upvoted: true, has_downvoted: false }));
}

#[tokio::test]
async fn test_downvote_own_answer_applies_author_delta_only() {
    let f = fixture().await;

    let response = f.service.create_vote(Some(ALICE), &vote(ANSWER, "answer", "downvote")).await;
    assert!(response.success);

    let target = TargetRef::answer(ANSWER);
    assert_eq!(f.repository.get_user_vote(ALICE, target).await.unwrap(), Some(VoteType::Downvote));
    assert_eq!(counts(&f.repository, target).await, (0, 1));
    assert_eq!(reputation(&f.repository, ALICE).await, -2);
}

#[tokio::test]
async fn test_upvote_own_content_collapses_reputation() {
    let f = fixture().await;
    f.service.create_vote(Some(BOB), &vote(QUESTION, "question", "upvote")).await;
    assert_eq!(reputation(&f.repository, BOB).await, 10);
}

#[tokio::test]
async fn test_repeat_vote_toggles_off() {
    let f = fixture().await;
    let target = TargetRef::question(QUESTION);

    f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    let response = f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    assert!(response.success);

    assert_eq!(f.repository.get_user_vote(ALICE, target).await.unwrap(), None);
    assert_eq!(counts(&f.repository, target).await, (0, 0));
    assert_eq!(reputation(&f.repository, ALICE).await, 0);
    assert_eq!(reputation(&f.repository, BOB).await, 0);

    let status = f.service.has_voted(Some(ALICE), &lookup(QUESTION, "question")).await;
    assert_eq!(status.data, Some(HasVotedResponse::default()));
}

#[tokio::test]
async fn test_opposite_vote_flips() {
    let f = fixture().await;
    let target = TargetRef::question(QUESTION);

    f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    assert_eq!(counts(&f.repository, target).await, (1, 0));

    let outcome = f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "downvote")).await;
    assert!(outcome.success);

    assert_eq!(counts(&f.repository, target).await, (0, 1));
    assert_eq!(f.repository.count_vote_rows(target).await, (0, 1));
    assert_eq!(reputation(&f.repository, ALICE).await, -1);
    assert_eq!(reputation(&f.repository, BOB).await, -2);
}

#[tokio::test]
async fn test_missing_target_is_not_found() {
    let f = fixture().await;

    let response = f.service.create_vote(Some(ALICE), &vote(999, "answer", "upvote")).await;
    assert!(!response.success);
    let error = response.error.unwrap();
    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(error.message, "Answer not found");
}

#[tokio::test]
async fn test_anonymous_vote_is_unauthorized() {
    let f = fixture().await;
    let response = f.service.create_vote(None, &vote(QUESTION, "question", "upvote")).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::Unauthorized));
    assert_eq!(counts(&f.repository, TargetRef::question(QUESTION)).await, (0, 0));
}

#[tokio::test]
async fn test_malformed_vote_reports_fields() {
    let f = fixture().await;
    let response = f.service.create_vote(Some(ALICE), &CreateVoteParams::default()).await;
    let error = response.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Validation);
    let fields = error.field_errors.unwrap();
    assert!(fields.contains_key("targetId"));
    assert!(fields.contains_key("targetType"));
    assert!(fields.contains_key("voteType"));
}

#[tokio::test]
async fn test_reputation_failure_rolls_back_vote() {
    let f = fixture().await;
    f.repository.fail_reputation_updates_for(BOB).await;
    let target = TargetRef::question(QUESTION);

    let response = f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::Internal));
    assert_eq!(response.error.unwrap().message, "An unexpected error occurred");

    let status = f.service.has_voted(Some(ALICE), &lookup(QUESTION, "question")).await;
    assert_eq!(status.data, Some(HasVotedResponse::default()));
    assert_eq!(counts(&f.repository, target).await, (0, 0));
    assert_eq!(reputation(&f.repository, ALICE).await, 0);
    assert!(f.repository.get_pending_interactions(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_committed_vote_is_logged_by_relay() {
    let f = fixture().await;
    f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    f.service.create_vote(Some(ALICE), &vote(ANSWER, "answer", "downvote")).await;

    assert!(f.repository.get_user_interactions(ALICE, 10).await.unwrap().is_empty());
    let report = f.relay.drain_once().await.unwrap();
    assert_eq!(report.delivered, 2);

    let interactions = f.service.query().interactions_for_user(ALICE, 10).await.unwrap();
    let actions: Vec<_> = interactions.iter().map(|i| i.action).collect();
    assert_eq!(actions, vec![InteractionAction::Downvote, InteractionAction::Upvote]);
}

#[tokio::test]
async fn test_log_failure_does_not_fail_vote() {
    let f = fixture().await;
    f.repository.fail_deliveries().await;

    let response = f.service.create_vote(Some(ALICE), &vote(QUESTION, "question", "upvote")).await;
    assert!(response.success);

    let report = f.relay.drain_once().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(counts(&f.repository, TargetRef::question(QUESTION)).await, (1, 0));
    assert_eq!(reputation(&f.repository, BOB).await, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_conserve_counters() {
    let f = fixture().await;
    let target = TargetRef::question(QUESTION);
    for user_id in 10..40 {
        f.repository.insert_user(user_id, 0).await;
    }

    let mut tasks = JoinSet::new();
    for user_id in 10..40_i64 {
        let service = f.service.clone();
        tasks.spawn(async move {
            let first = if user_id % 2 == 0 { "upvote" } else { "downvote" };
            service.create_vote(Some(user_id), &vote(QUESTION, "question", first)).await;
            match user_id % 3 {
                0 => {
                    service.create_vote(Some(user_id), &vote(QUESTION, "question", first)).await;
                }
                1 => {
                    let second = if first == "upvote" { "downvote" } else { "upvote" };
                    service.create_vote(Some(user_id), &vote(QUESTION, "question", second)).await;
                }
                _ => {}
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let counters = f.repository.get_votes_count(target).await.unwrap().unwrap();
    let (live_up, live_down) = f.repository.count_vote_rows(target).await;
    assert_eq!((counters.upvotes, counters.downvotes), (live_up, live_down));
    assert_eq!(counters.total(), 20);
}

#[tokio::test]
async fn test_content_events_move_author_reputation() {
    let f = fixture().await;

    let post = ContentEventParams {
        action: Some("post".to_string()),
        target_id: Some(QUESTION.into()),
        target_type: Some("question".to_string()),
        author_id: Some(BOB.into()),
    };
    assert!(f.service.record_content_event(Some(BOB), &post).await.success);
    assert_eq!(reputation(&f.repository, BOB).await, 5);

    assert!(f.service.record_content_event(Some(BOB), &post).await.success);
    assert_eq!(reputation(&f.repository, BOB).await, 5);

    let delete = ContentEventParams { action: Some("delete".to_string()), ..post.clone() };
    assert!(f.service.record_content_event(Some(BOB), &delete).await.success);
    assert_eq!(reputation(&f.repository, BOB).await, 0);

    let wrong_author = ContentEventParams { author_id: Some(ALICE.into()), ..post };
    let response = f.service.record_content_event(Some(ALICE), &wrong_author).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(reputation(&f.repository, ALICE).await, 0);
}

#[tokio::test]
async fn test_toggle_save_question() {
    let f = fixture().await;
    let params = CollectionParams { question_id: Some(QUESTION.into()) };

    let saved = f.service.toggle_save_question(Some(ALICE), &params).await;
    assert_eq!(saved.data.map(|d| d.saved), Some(true));
    assert_eq!(f.service.has_saved_question(Some(ALICE), &params).await.data.map(|d| d.saved), Some(true));

    let removed = f.service.toggle_save_question(Some(ALICE), &params).await;
    assert_eq!(removed.data.map(|d| d.saved), Some(false));
    assert_eq!(reputation(&f.repository, ALICE).await, 0);

    let missing = f.service.toggle_save_question(Some(ALICE), &CollectionParams { question_id: Some(5_i64.into()) }).await;
    assert_eq!(missing.error_kind(), Some(ErrorKind::NotFound));

    f.relay.drain_once().await.unwrap();
    let interactions = f.service.query().interactions_for_user(ALICE, 10).await.unwrap();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0].action, InteractionAction::Bookmark);
}
