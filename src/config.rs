//! Application configuration.
//!
//! DESIGN
//! ======
//! The model endpoint table is structured data, so it lives in a TOML file
//! (path from `CHATARENA_CONFIG`, default `chatarena.toml`) loaded once at
//! startup and shared read-only behind an `Arc`. Process-level settings
//! (`PORT`) stay in environment variables. Load failures are fatal; an
//! unknown model id at request time is a per-request error, not a crash.

use std::path::Path;

use serde::Deserialize;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_MAX_TURNS: usize = 5;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// MODEL ENDPOINTS
// =============================================================================

/// Endpoint capability: plain text, or text plus image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Text,
    Image,
}

/// Static per-model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEndpoint {
    /// Identifier used by the UI and in request routing.
    pub id: String,
    /// Upstream chat-completions URL.
    pub url: String,
    pub kind: ModelKind,
    /// Model name sent in the request payload; defaults to `id`.
    #[serde(default)]
    model: Option<String>,
}

impl ModelEndpoint {
    #[must_use]
    pub fn payload_model(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.id)
    }

    #[must_use]
    pub fn supports_images(&self) -> bool {
        self.kind == ModelKind::Image
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Remote file-store endpoint the relay POSTs multipart uploads to.
    pub url: String,
    /// Prefix prepended to a stored image reference to form the full URL
    /// passed to an image-capable model.
    pub image_base_url: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE, top_p: DEFAULT_TOP_P }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryConfig {
    /// Retained conversation pairs; total turns are capped at twice this.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_turns: DEFAULT_MAX_TURNS }
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_top_p() -> f32 {
    DEFAULT_TOP_P
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub models: Vec<ModelEndpoint>,
    pub upload: UploadConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is unreadable, malformed, or
    /// fails validation (empty model table, duplicate or empty ids, empty
    /// URLs).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on malformed TOML or failed validation.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("at least one model endpoint is required".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for endpoint in &self.models {
            if endpoint.id.trim().is_empty() {
                return Err(ConfigError::Invalid("model id must not be empty".into()));
            }
            if endpoint.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("model {} has an empty url", endpoint.id)));
            }
            if !seen.insert(endpoint.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate model id: {}", endpoint.id)));
            }
        }
        if self.upload.url.trim().is_empty() {
            return Err(ConfigError::Invalid("upload.url must not be empty".into()));
        }
        Ok(())
    }

    /// Look up an endpoint by model identifier.
    #[must_use]
    pub fn endpoint(&self, id: &str) -> Option<&ModelEndpoint> {
        self.models.iter().find(|endpoint| endpoint.id == id)
    }

    /// Model identifiers in declaration order (the UI dropdown order).
    #[must_use]
    pub fn model_ids(&self) -> Vec<&str> {
        self.models.iter().map(|endpoint| endpoint.id.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
