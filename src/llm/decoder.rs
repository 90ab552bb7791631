//! SSE stream decoder — raw bytes to cumulative text snapshots.
//!
//! DESIGN
//! ======
//! Upstream endpoints answer with newline-delimited `data: {json}` frames.
//! [`SnapshotDecoder`] is a pure incremental state machine (no I/O) so the
//! frame handling is testable byte-for-byte; [`decode_stream`] wraps it
//! around any fallible byte stream and yields the accumulated text after
//! every content-bearing frame.
//!
//! Malformed frames are logged and skipped — a single bad line never kills
//! the stream. A transport error mid-iteration is folded into one final
//! chat-visible error string, because the ultimate sink for everything this
//! module produces is assistant text in the UI.

use futures::{Stream, StreamExt, pin_mut};
use serde::Deserialize;
use tracing::warn;

use super::types::LlmError;

const EVENT_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One `data:` frame body. Frames without `choices[0].delta.content`
/// (role-only deltas, heartbeats, finish markers) deserialize fine and
/// simply carry no content.
#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

// =============================================================================
// INCREMENTAL DECODER
// =============================================================================

/// Pure incremental decoder: feed raw chunks, get back the cumulative
/// snapshots those chunks completed. Carries the partial-line buffer across
/// chunk boundaries, so frames split mid-line reassemble correctly.
#[derive(Debug, Default)]
pub struct SnapshotDecoder {
    buffer: String,
    accumulated: String,
    done: bool,
}

impl SnapshotDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes; returns a snapshot (the full accumulated
    /// text) for every content-bearing frame the chunk completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut snapshots = Vec::new();
        if self.done {
            return snapshots;
        }
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);

            if line.is_empty() {
                continue;
            }
            let Some(payload) = line.strip_prefix(EVENT_PREFIX) else {
                continue;
            };
            if payload == DONE_SENTINEL {
                self.done = true;
                break;
            }
            if let Some(fragment) = delta_content(payload) {
                self.accumulated.push_str(&fragment);
                snapshots.push(self.accumulated.clone());
            }
        }
        snapshots
    }

    /// True once the terminal `data: [DONE]` sentinel has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Parse one frame payload and extract its incremental content, if any.
/// Malformed JSON is logged and treated as content-free.
fn delta_content(payload: &str) -> Option<String> {
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => event
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content),
        Err(e) => {
            warn!(error = %e, "skipping malformed stream frame");
            None
        }
    }
}

// =============================================================================
// STREAM ADAPTER
// =============================================================================

/// Decode a fallible byte stream into a lazy sequence of cumulative text
/// snapshots. A transport error during iteration yields one final error
/// string and ends the sequence; normal end of the body ends it silently.
pub fn decode_stream<S, B, E>(body: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = SnapshotDecoder::new();
        pin_mut!(body);
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    for snapshot in decoder.feed(bytes.as_ref()) {
                        yield snapshot;
                    }
                    if decoder.is_done() {
                        return;
                    }
                }
                Err(e) => {
                    yield LlmError::Transport(e.to_string()).to_string();
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod tests;
