//! Upload relay — forwards a local file to the remote file store.
//!
//! DESIGN
//! ======
//! The store is behind a trait so handlers can be tested with a mock (the
//! same seam the inference side gets from returning plain streams). The
//! relay itself is deliberately dumb: one multipart POST, no retry, no
//! integrity check; failure is logged by the caller and the conversation's
//! pending image is simply left untouched.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::services::conversation::Conversation;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The local file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The HTTP request to the file store failed.
    #[error("upload request failed: {0}")]
    Request(String),

    /// The file store answered with a non-success HTTP status.
    #[error("upload failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The file store's response body could not be deserialized.
    #[error("upload response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// RESPONSE
// =============================================================================

/// File-store response. Only `download_url` is required; the remaining
/// fields are informational and may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub download_url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Remote file store seam. Mocked in tests.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Upload one local file, returning the store's reference URL.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] on unreadable input, transport failure,
    /// non-success status, or an undecodable response body.
    async fn upload(&self, path: &Path) -> Result<UploadResponse, UploadError>;
}

/// HTTP implementation posting `multipart/form-data` with a `file` field.
pub struct RemoteFileStore {
    http: reqwest::Client,
    upload_url: String,
}

impl RemoteFileStore {
    #[must_use]
    pub fn new(http: reqwest::Client, upload_url: String) -> Self {
        Self { http, upload_url }
    }
}

#[async_trait::async_trait]
impl FileStore for RemoteFileStore {
    async fn upload(&self, path: &Path) -> Result<UploadResponse, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(UploadError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| UploadError::Parse(e.to_string()))
    }
}

// =============================================================================
// UPLOAD HANDLING
// =============================================================================

/// Relay a file upload and apply the result to the given conversations.
///
/// On success every conversation's pending image is set to the returned
/// `download_url` and the store response is handed back; on failure the
/// error is logged and every pending image is left untouched. With no
/// file, the pending image is cleared (the UI's "remove upload" event) and
/// `Ok(None)` is returned.
///
/// # Errors
///
/// Returns the store's [`UploadError`] unchanged; conversations are only
/// touched on the success path.
pub async fn handle_file_upload<'a, I>(
    store: &dyn FileStore,
    file: Option<&Path>,
    conversations: I,
) -> Result<Option<UploadResponse>, UploadError>
where
    I: IntoIterator<Item = &'a mut Conversation>,
{
    let Some(path) = file else {
        info!("clearing pending upload");
        for conversation in conversations {
            conversation.set_pending_image(None);
        }
        return Ok(None);
    };

    match store.upload(path).await {
        Ok(response) => {
            info!(download_url = %response.download_url, "file uploaded");
            for conversation in conversations {
                conversation.set_pending_image(Some(response.download_url.clone()));
            }
            Ok(Some(response))
        }
        Err(e) => {
            error!(error = %e, path = %path.display(), "file upload failed");
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
