// HTTP request handlers
use std::future::Future;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::error;
use votes_ledger_pipeline::LedgerError;
use votes_ledger_repository::LedgerRepositoryError;
use votes_ledger_shared::types::{
    ActionResponse, CollectionParams, ContentEventParams, CreateVoteParams, ErrorBody, ErrorKind, FieldErrors,
    HasVotedParams, HasVotedResponse, SavedResponse, UserId,
};

use crate::server::ACTOR_HEADER;
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Votes ledger is running")
}

pub async fn create_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateVoteParams>, JsonRejection>,
) -> impl IntoResponse {
    let (actor, Json(params)) = match (actor_id(&headers), payload) {
        (Ok(actor), Ok(params)) => (actor, params),
        (Err(e), _) => return reply::<()>(ActionResponse::failure(e.to_error_body())),
        (_, Err(rejection)) => return reply::<()>(rejected(rejection.body_text())),
    };
    let service = state.service.clone();
    reply(run_to_completion(async move { service.create_vote(actor, &params).await }).await)
}

pub async fn has_voted(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<HasVotedParams>, QueryRejection>,
) -> impl IntoResponse {
    let (actor, Query(params)) = match (actor_id(&headers), query) {
        (Ok(actor), Ok(params)) => (actor, params),
        (Err(e), _) => return reply::<HasVotedResponse>(ActionResponse::failure(e.to_error_body())),
        (_, Err(rejection)) => return reply::<HasVotedResponse>(rejected(rejection.body_text())),
    };
    reply(state.service.has_voted(actor, &params).await)
}

pub async fn record_content_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContentEventParams>, JsonRejection>,
) -> impl IntoResponse {
    let (actor, Json(params)) = match (actor_id(&headers), payload) {
        (Ok(actor), Ok(params)) => (actor, params),
        (Err(e), _) => return reply::<()>(ActionResponse::failure(e.to_error_body())),
        (_, Err(rejection)) => return reply::<()>(rejected(rejection.body_text())),
    };
    let service = state.service.clone();
    reply(run_to_completion(async move { service.record_content_event(actor, &params).await }).await)
}

pub async fn toggle_save_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CollectionParams>, JsonRejection>,
) -> impl IntoResponse {
    let (actor, Json(params)) = match (actor_id(&headers), payload) {
        (Ok(actor), Ok(params)) => (actor, params),
        (Err(e), _) => return reply::<SavedResponse>(ActionResponse::failure(e.to_error_body())),
        (_, Err(rejection)) => return reply::<SavedResponse>(rejected(rejection.body_text())),
    };
    let service = state.service.clone();
    reply(run_to_completion(async move { service.toggle_save_question(actor, &params).await }).await)
}

pub async fn has_saved_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<CollectionParams>, QueryRejection>,
) -> impl IntoResponse {
    let (actor, Query(params)) = match (actor_id(&headers), query) {
        (Ok(actor), Ok(params)) => (actor, params),
        (Err(e), _) => return reply::<SavedResponse>(ActionResponse::failure(e.to_error_body())),
        (_, Err(rejection)) => return reply::<SavedResponse>(rejected(rejection.body_text())),
    };
    reply(state.service.has_saved_question(actor, &params).await)
}

/// Reads the acting user from the request headers.
///
/// A missing header yields `None` so the operation reports the caller as
/// unauthorized; a header that is not a positive integer is a validation error.
fn actor_id(headers: &HeaderMap) -> Result<Option<UserId>, LedgerError> {
    let Some(value) = headers.get(ACTOR_HEADER) else {
        return Ok(None);
    };
    match value.to_str().ok().and_then(|raw| raw.trim().parse::<UserId>().ok()) {
        Some(id) if id > 0 => Ok(Some(id)),
        _ => {
            let mut fields = FieldErrors::new();
            fields.insert("actorId".to_string(), vec!["Actor ID must be a positive integer".to_string()]);
            Err(LedgerError::Validation(fields))
        }
    }
}

fn rejected<T>(message: String) -> ActionResponse<T> {
    ActionResponse::failure(ErrorBody { kind: ErrorKind::Validation, message, field_errors: None })
}

/// Runs a mutating operation on its own task so that a client disconnect
/// cannot cancel it between the commit and the relay notification.
async fn run_to_completion<T, F>(operation: F) -> ActionResponse<T>
where
    F: Future<Output = ActionResponse<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(operation).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Ledger task failed");
            let err = LedgerError::from(LedgerRepositoryError::Unavailable(e.to_string()));
            ActionResponse::failure(err.to_error_body())
        }
    }
}

fn status_for(kind: Option<ErrorKind>) -> StatusCode {
    match kind {
        None => StatusCode::OK,
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::Unauthorized) => StatusCode::UNAUTHORIZED,
        Some(ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply<T: Serialize>(response: ActionResponse<T>) -> (StatusCode, Json<ActionResponse<T>>) {
    (status_for(response.error_kind()), Json(response))
}
