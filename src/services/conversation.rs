//! Conversation store — bounded message log plus pending image reference.
//!
//! A plain owned struct with no interior locking: each conversation belongs
//! to exactly one session and the session registry's lock serializes
//! access. Mutation happens only between requests (the final pair is
//! appended after a stream completes), never mid-stream.

use tracing::debug;

use crate::llm::types::Turn;

/// Per-conversation state: ordered turns, capped at `max_turns` pairs, and
/// an optional pending image reference consumed by the next request to an
/// image-capable model.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
    max_turns: usize,
    pending_image: Option<String>,
    label: String,
}

impl Conversation {
    #[must_use]
    pub fn new(max_turns: usize, label: impl Into<String>) -> Self {
        Self { turns: Vec::new(), max_turns, pending_image: None, label: label.into() }
    }

    /// Append a completed user/assistant pair. When the log is full, the
    /// oldest pair (the two oldest turns) is evicted first.
    pub fn append_turn_pair(&mut self, user_text: &str, assistant_text: &str) {
        if self.turns.len() >= self.max_turns * 2 {
            self.turns.drain(..2);
            debug!(conversation = %self.label, "evicted oldest turn pair");
        }
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::assistant(assistant_text));
        debug!(conversation = %self.label, turns = self.turns.len(), "appended turn pair");
    }

    /// Immutable copy of the turn sequence, safe to hand to a request
    /// builder while later writes happen.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Replace the pending image reference.
    pub fn set_pending_image(&mut self, reference: Option<String>) {
        debug!(conversation = %self.label, image = ?reference, "pending image updated");
        self.pending_image = reference;
    }

    #[must_use]
    pub fn pending_image(&self) -> Option<&str> {
        self.pending_image.as_deref()
    }

    /// Empty the turn log and drop the pending image reference.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending_image = None;
        debug!(conversation = %self.label, "cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
