//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the immutable config, one shared HTTP client (transport-level
//! pooling only), the inference client, the file-store handle, and the
//! session registry. Each session mirrors the UI's tabs: one direct
//! conversation plus a battle pair, created on demand and kept for the
//! process lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::InferenceClient;
use crate::services::conversation::Conversation;
use crate::services::upload::{FileStore, RemoteFileStore};

const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// SESSION
// =============================================================================

/// Per-session conversation state. One direct conversation and one
/// conversation per battle side, each independently bounded.
pub struct Session {
    pub direct: Conversation,
    pub battle_a: Conversation,
    pub battle_b: Conversation,
}

impl Session {
    #[must_use]
    pub fn new(max_turns: usize) -> Self {
        Self {
            direct: Conversation::new(max_turns, "direct"),
            battle_a: Conversation::new(max_turns, "battle-a"),
            battle_b: Conversation::new(max_turns, "battle-b"),
        }
    }

    /// Conversations addressed by a UI target: the direct tab, or both
    /// battle sides at once (an uploaded image applies to both).
    pub fn target_conversations(&mut self, target: Target) -> Vec<&mut Conversation> {
        match target {
            Target::Direct => vec![&mut self.direct],
            Target::Battle => vec![&mut self.battle_a, &mut self.battle_b],
        }
    }
}

/// Which tab's conversation(s) a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Direct,
    Battle,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via the State
/// extractor. Clone is required by Axum — all inner fields are Arc-wrapped
/// or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: InferenceClient,
    pub file_store: Arc<dyn FileStore>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    /// Build state from loaded config.
    ///
    /// No overall request timeout is set: inference responses are
    /// long-lived streams. Connect attempts still time out.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        let config = Arc::new(config);
        let llm = InferenceClient::new(http.clone(), config.clone());
        let file_store = Arc::new(RemoteFileStore::new(http, config.upload.url.clone()));
        Ok(Self { config, llm, file_store, sessions: Arc::new(RwLock::new(HashMap::new())) })
    }

    /// Get or create the session for `id` and apply `f` to it.
    pub async fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id)
            .or_insert_with(|| Session::new(self.config.history.max_turns));
        f(session)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_session_creates_on_demand() {
        let state = test_helpers::test_app_state();
        let id = Uuid::new_v4();

        let len = state.with_session(id, |session| session.direct.len()).await;
        assert_eq!(len, 0);
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn with_session_reuses_existing_entry() {
        let state = test_helpers::test_app_state();
        let id = Uuid::new_v4();

        state
            .with_session(id, |session| session.direct.append_turn_pair("u", "a"))
            .await;
        let len = state.with_session(id, |session| session.direct.len()).await;

        assert_eq!(len, 2);
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[test]
    fn session_conversations_start_empty() {
        let session = Session::new(5);
        assert!(session.direct.is_empty());
        assert!(session.battle_a.is_empty());
        assert!(session.battle_b.is_empty());
    }
}
