//! Chat, battle, model-list, and clear routes.
//!
//! DESIGN
//! ======
//! Streaming endpoints answer with SSE: one JSON event per snapshot (or
//! snapshot pair in battle mode). The session lock is held only to read
//! the conversation at dispatch and to append the final pair after the
//! stream completes — never across upstream I/O. If the browser drops the
//! SSE response, the generator (and with it the upstream connection) is
//! dropped and nothing is appended.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, pin_mut};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ModelKind;
use crate::llm::{LlmError, interleave};
use crate::state::{AppState, Target};

// =============================================================================
// BODIES / EVENTS
// =============================================================================

#[derive(Deserialize)]
pub struct ChatBody {
    pub session_id: Uuid,
    pub model: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct BattleBody {
    pub session_id: Uuid,
    pub model_a: String,
    pub model_b: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ClearBody {
    pub session_id: Uuid,
    pub target: Target,
}

#[derive(Serialize)]
struct ChatChunk<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BattleChunk<'a> {
    a: &'a str,
    b: &'a str,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub kind: ModelKind,
}

fn llm_error_to_status(e: &LlmError) -> StatusCode {
    warn!(error = %e, "rejecting inference request");
    match e {
        LlmError::UnknownModel(_) => StatusCode::BAD_REQUEST,
        LlmError::Transport(_) | LlmError::Status { .. } => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/models` — configured models in declaration order.
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    let models = state
        .config
        .models
        .iter()
        .map(|endpoint| ModelInfo { id: endpoint.id.clone(), kind: endpoint.kind })
        .collect();
    Json(models)
}

/// `POST /api/chat` — stream one model's snapshots as SSE.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, StatusCode> {
    let ChatBody { session_id, model, message } = body;
    info!(%session_id, %model, "chat request");

    let snapshots = state
        .with_session(session_id, |session| {
            state.llm.stream_chat(&model, &message, &session.direct)
        })
        .await
        .map_err(|e| llm_error_to_status(&e))?;

    let events = async_stream::stream! {
        let mut final_text: Option<String> = None;
        pin_mut!(snapshots);
        while let Some(snapshot) = snapshots.next().await {
            yield Event::default().json_data(ChatChunk { text: &snapshot });
            final_text = Some(snapshot);
        }
        if let Some(final_text) = final_text {
            state
                .with_session(session_id, |session| {
                    session.direct.append_turn_pair(&message, &final_text);
                })
                .await;
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `POST /api/battle` — stream interleaved snapshot pairs from two models.
pub async fn battle(
    State(state): State<AppState>,
    Json(body): Json<BattleBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, StatusCode> {
    let BattleBody { session_id, model_a, model_b, message } = body;
    info!(%session_id, %model_a, %model_b, "battle request");

    let (side_a, side_b) = state
        .with_session(session_id, |session| {
            let side_a = state.llm.stream_chat(&model_a, &message, &session.battle_a);
            let side_b = state.llm.stream_chat(&model_b, &message, &session.battle_b);
            (side_a, side_b)
        })
        .await;
    let side_a = side_a.map_err(|e| llm_error_to_status(&e))?;
    let side_b = side_b.map_err(|e| llm_error_to_status(&e))?;

    let pairs = interleave(side_a, side_b);
    let events = async_stream::stream! {
        let mut final_pair: Option<(String, String)> = None;
        pin_mut!(pairs);
        while let Some((a, b)) = pairs.next().await {
            yield Event::default().json_data(BattleChunk { a: &a, b: &b });
            final_pair = Some((a, b));
        }
        if let Some((a, b)) = final_pair {
            state
                .with_session(session_id, |session| {
                    session.battle_a.append_turn_pair(&message, &a);
                    session.battle_b.append_turn_pair(&message, &b);
                })
                .await;
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `POST /api/clear` — reset the targeted conversation(s) and pending
/// image. The UI also calls this when the selected model changes.
pub async fn clear(State(state): State<AppState>, Json(body): Json<ClearBody>) -> StatusCode {
    info!(session_id = %body.session_id, target = ?body.target, "clearing conversations");
    state
        .with_session(body.session_id, |session| {
            for conversation in session.target_conversations(body.target) {
                conversation.clear();
            }
        })
        .await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
