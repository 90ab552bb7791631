//! LLM relay core — streaming inference against configured endpoints.
//!
//! DESIGN
//! ======
//! `decoder` turns raw SSE bytes into cumulative snapshots, `client` owns
//! request construction and the per-call HTTP stream, `battle` interleaves
//! two client streams into synchronized pairs. Everything upstream-facing
//! is typed at the serde boundary; nothing in this module touches shared
//! state.

pub mod battle;
pub mod client;
pub mod decoder;
pub mod types;

pub use battle::interleave;
pub use client::InferenceClient;
pub use types::LlmError;
