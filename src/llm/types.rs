//! Inference types — wire-level message shapes and errors.
//!
//! Provider shapes follow the OpenAI-compatible chat-completions API the
//! upstream endpoints speak: a message's content is either a plain string
//! or a list of typed parts (text, image reference).

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by inference client operations.
///
/// Only [`LlmError::UnknownModel`] surfaces as a hard error to callers —
/// transport and status failures are folded into the snapshot stream as a
/// single chat-visible error string, so one failing model never crashes a
/// request or its battle peer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The requested model identifier is not in the endpoint table.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The HTTP request to the upstream endpoint failed.
    #[error("Error during inference: {0}")]
    Transport(String),

    /// The upstream endpoint answered with a non-success HTTP status.
    #[error("Error during inference: upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: TurnContent::Text(text.into()) }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: TurnContent::Text(text.into()) }
    }
}

/// Message content — a plain string or a sequence of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A structured content part in a multimodal user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageRef },

    #[serde(rename = "text")]
    Text { text: String },
}

/// Wrapper object the chat-completions API expects around an image URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
