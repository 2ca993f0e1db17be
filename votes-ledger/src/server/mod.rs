//! HTTP surface of the ledger.
//!
//! Every operation answers with the JSON action envelope. The acting user is
//! taken from the `x-actor-id` header.
pub mod handlers;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use votes_ledger_pipeline::LedgerService;

use self::state::AppState;
use crate::errors::LedgerAppError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// Builds the application router with all routes and middleware.
pub fn create_app(service: Arc<LedgerService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/votes", post(handlers::create_vote))
        .route("/votes/status", get(handlers::has_voted))
        .route("/content-events", post(handlers::record_content_event))
        .route("/collections/toggle", post(handlers::toggle_save_question))
        .route("/collections/status", get(handlers::has_saved_question))
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer())
        .with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::HeaderName::from_static(ACTOR_HEADER)])
}

/// Serves `app` on `addr` until `shutdown` resolves.
pub async fn run_server<F>(app: Router, addr: SocketAddr, shutdown: F) -> Result<(), LedgerAppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
