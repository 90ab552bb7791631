//! File upload route — browser multipart in, remote file store out.
//!
//! The uploaded part is staged under a unique temp name, relayed through
//! the upload service, and removed afterwards. The session lock is held
//! across the relay so a conversation never observes a half-applied
//! upload; the store is an internal service and single-user sessions make
//! the brief global stall acceptable.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::upload::handle_file_upload;
use crate::state::{AppState, Target};

#[derive(Serialize)]
pub struct UploadResult {
    /// Reference URL now pending on the targeted conversation(s); `None`
    /// when the request cleared the pending image instead.
    pub download_url: Option<String>,
}

/// `POST /api/upload` — multipart fields: `session_id`, `target`
/// (`direct` | `battle`), and optionally `file`. Without a file the
/// pending image is cleared.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, (StatusCode, String)> {
    let mut session_id: Option<Uuid> = None;
    let mut target: Option<Target> = None;
    let mut staged: Option<PathBuf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("session_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                session_id = Some(
                    text.parse()
                        .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid session_id: {text}")))?,
                );
            }
            Some("target") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                target = Some(parse_target(&text).ok_or_else(|| {
                    (StatusCode::BAD_REQUEST, format!("invalid target: {text}"))
                })?);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .rsplit(['/', '\\'])
                    .next()
                    .unwrap_or("upload")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                let path = std::env::temp_dir().join(format!("chatarena-{}-{file_name}", Uuid::new_v4()));
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("could not stage upload: {e}")))?;
                staged = Some(path);
            }
            _ => {}
        }
    }

    let (session_id, target) = match (session_id, target) {
        (Some(session_id), Some(target)) => (session_id, target),
        _ => {
            remove_staged(staged.as_deref()).await;
            return Err((StatusCode::BAD_REQUEST, "missing session_id or target field".to_string()));
        }
    };

    info!(%session_id, ?target, staged = staged.is_some(), "upload request");

    let result = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .entry(session_id)
            .or_insert_with(|| crate::state::Session::new(state.config.history.max_turns));
        handle_file_upload(
            state.file_store.as_ref(),
            staged.as_deref(),
            session.target_conversations(target),
        )
        .await
    };

    remove_staged(staged.as_deref()).await;

    match result {
        Ok(response) => Ok(Json(UploadResult {
            download_url: response.map(|r| r.download_url),
        })),
        Err(e) => Err((StatusCode::BAD_GATEWAY, e.to_string())),
    }
}

async fn remove_staged(staged: Option<&std::path::Path>) {
    if let Some(path) = staged {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(error = %e, path = %path.display(), "could not remove staged upload");
        }
    }
}

fn parse_target(raw: &str) -> Option<Target> {
    match raw {
        "direct" => Some(Target::Direct),
        "battle" => Some(Target::Battle),
        _ => None,
    }
}

#[cfg(test)]
#[path = "upload_route_test.rs"]
mod tests;
