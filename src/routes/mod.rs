//! Router assembly.
//!
//! Browser-facing API only: SSE streaming for chat and battle, multipart
//! for uploads, JSON for everything else. CORS is wide open — the relay
//! carries no credentials and the UI may be served from anywhere.

pub mod chat;
pub mod upload;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/models", get(chat::list_models))
        .route("/api/chat", post(chat::chat))
        .route("/api/battle", post(chat::battle))
        .route("/api/clear", post(chat::clear))
        .route("/api/upload", post(upload::upload))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
