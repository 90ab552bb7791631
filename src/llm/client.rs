//! Inference client — one streaming chat-completions call per invocation.
//!
//! DESIGN
//! ======
//! `build_request` is pure so payload construction is tested directly.
//! `stream_chat` resolves the endpoint (fail-fast on unknown ids, before
//! any connection exists), then returns a lazy stream that owns the HTTP
//! call: the request is sent on first poll, the response body is handed to
//! the decoder, and dropping the stream drops the response — closing the
//! upstream connection on abandonment.
//!
//! Connection-open failures and non-2xx statuses are not `Err`s here: they
//! become the stream's single yielded value, because the sink for this
//! text is the chat window itself.

use std::sync::Arc;

use futures::{Stream, StreamExt, pin_mut};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::{AppConfig, ModelEndpoint, SamplingConfig};
use crate::llm::decoder::decode_stream;
use crate::llm::types::{ContentPart, ImageRef, LlmError, Role, Turn, TurnContent};
use crate::services::conversation::Conversation;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<Turn>,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

// =============================================================================
// CLIENT
// =============================================================================

/// Streaming inference client over the shared HTTP connection pool.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl InferenceClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// Issue a streaming chat request and return the lazy sequence of
    /// cumulative snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::UnknownModel`] when `model_id` is not in the
    /// endpoint table — immediately, with zero yielded values. Transport
    /// and status failures after this point surface as stream content.
    pub fn stream_chat(
        &self,
        model_id: &str,
        message: &str,
        conversation: &Conversation,
    ) -> Result<impl Stream<Item = String> + Send + use<>, LlmError> {
        let endpoint = self
            .config
            .endpoint(model_id)
            .ok_or_else(|| LlmError::UnknownModel(model_id.to_string()))?;

        let request = build_request(
            endpoint,
            message,
            conversation.snapshot(),
            conversation.pending_image(),
            &self.config.upload.image_base_url,
            self.config.sampling,
        );
        let url = endpoint.url.clone();
        let http = self.http.clone();

        debug!(model = %model_id, %url, messages = request.messages.len(), "dispatching inference request");

        Ok(async_stream::stream! {
            let response = match http.post(&url).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, %url, "inference request failed");
                    yield LlmError::Transport(e.to_string()).to_string();
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!(status = status.as_u16(), %url, "inference endpoint rejected request");
                yield LlmError::Status { status: status.as_u16(), body }.to_string();
                return;
            }

            let snapshots = decode_stream(response.bytes_stream());
            pin_mut!(snapshots);
            while let Some(snapshot) = snapshots.next().await {
                yield snapshot;
            }
        })
    }
}

// =============================================================================
// REQUEST BUILD
// =============================================================================

/// Assemble the upstream payload: prior turns plus the new user turn.
///
/// The pending image is attached only when the endpoint is image-capable;
/// its reference is resolved against the configured image base URL. Text
/// endpoints get plain string content even when an image is pending.
pub(crate) fn build_request(
    endpoint: &ModelEndpoint,
    message: &str,
    mut history: Vec<Turn>,
    pending_image: Option<&str>,
    image_base_url: &str,
    sampling: SamplingConfig,
) -> ChatRequest {
    let content = match pending_image {
        Some(reference) if endpoint.supports_images() => TurnContent::Parts(vec![
            ContentPart::ImageUrl {
                image_url: ImageRef { url: format!("{image_base_url}{reference}") },
            },
            ContentPart::Text { text: message.to_string() },
        ]),
        _ => TurnContent::Text(message.to_string()),
    };
    history.push(Turn { role: Role::User, content });

    ChatRequest {
        model: endpoint.payload_model().to_string(),
        messages: history,
        temperature: sampling.temperature,
        top_p: sampling.top_p,
        stream: true,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
