use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use votes_ledger::server::create_app;
use votes_ledger_pipeline::{InteractionRelay, LedgerService, RelayConfig};
use votes_ledger_repository::{InMemoryLedgerRepository, LedgerRepository};
use votes_ledger_shared::types::TargetRef;

async fn setup() -> (Router, InMemoryLedgerRepository) {
    let repository = InMemoryLedgerRepository::new();
    repository.insert_user(1, 0).await;
    repository.insert_user(2, 0).await;
    repository.insert_question(10, 2).await;

    let relay = InteractionRelay::new(
        Arc::new(repository.clone()),
        RelayConfig { batch_size: 10, poll_interval: Duration::from_secs(60) },
    );
    let service = LedgerService::new(Arc::new(repository.clone()), Arc::new(repository.clone()), relay.signal());
    (create_app(Arc::new(service)), repository)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, actor: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header("content-type", "application/json");
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, actor: &str) -> Request<Body> {
    Request::builder().uri(uri).header("x-actor-id", actor).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_vote_then_status() {
    let (app, repository) = setup().await;

    let (status, body) = send(
        &app,
        post_json("/votes", Some("1"), json!({"targetId": 10, "targetType": "question", "voteType": "upvote"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = send(&app, get("/votes/status?targetId=10&targetType=question", "1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"hasUpvoted": true, "hasDownvoted": false}));

    assert_eq!(repository.get_votes_count(TargetRef::question(10)).await.unwrap().unwrap().upvotes, 1);
    assert_eq!(repository.get_reputation(2).await.unwrap(), Some(10));
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        post_json("/votes", None, json!({"targetId": 10, "targetType": "question", "voteType": "upvote"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_fields_are_bad_request() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        post_json("/votes", Some("1"), json!({"targetId": 10, "targetType": "comment", "voteType": "upvote"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
    assert!(body["error"]["fieldErrors"]["targetType"].is_array());

    let (status, body) = send(&app, post_json("/votes", Some("abc"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["actorId"].is_array());
}

#[tokio::test]
async fn test_malformed_ids_are_reported_per_field() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, post_json("/votes", Some("1"), json!({"targetId": 1.5, "targetType": "comment"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &body["error"]["fieldErrors"];
    assert_eq!(fields["targetId"], json!(["Target ID must be a positive integer"]));
    assert!(fields["targetType"].is_array());
    assert_eq!(fields["voteType"], json!(["Vote type is required"]));

    let (status, body) = send(
        &app,
        post_json("/votes", Some("1"), json!({"targetId": "ten", "targetType": "question", "voteType": "upvote"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fieldErrors"]["targetId"], json!(["Target ID must be a positive integer"]));

    let (status, body) = send(&app, get("/votes/status?targetId=abc&targetType=question", "1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fieldErrors"]["targetId"], json!(["Target ID must be a positive integer"]));

    let (status, body) = send(&app, post_json("/collections/toggle", Some("1"), json!({"questionId": 2.5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["questionId"].is_array());
}

#[tokio::test]
async fn test_unknown_target_is_not_found() {
    let (app, _) = setup().await;
    let (status, body) = send(
        &app,
        post_json("/votes", Some("1"), json!({"targetId": 99, "targetType": "question", "voteType": "downvote"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Question not found");
}

#[tokio::test]
async fn test_collection_toggle_and_status() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, post_json("/collections/toggle", Some("1"), json!({"questionId": 10}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["saved"], true);

    let (_, body) = send(&app, get("/collections/status?questionId=10", "1")).await;
    assert_eq!(body["data"]["saved"], true);
}

#[tokio::test]
async fn test_content_event_credits_author() {
    let (app, repository) = setup().await;
    let (status, _) = send(
        &app,
        post_json(
            "/content-events",
            Some("2"),
            json!({"action": "post", "targetId": 10, "targetType": "question", "authorId": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repository.get_reputation(2).await.unwrap(), Some(5));
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
