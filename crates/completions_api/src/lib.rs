//! Transport-only client primitives for OpenAI-compatible chat completions.
//!
//! This crate owns request building, SSE parsing, and error normalization
//! for `/chat/completions` endpoints only. It intentionally contains no
//! provider-contract coupling and no conversation bookkeeping.
//!
//! Requests are sent exactly once: a failed call surfaces as an error for
//! the caller to record, never as a retry loop.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::CompletionsApiClient;
pub use client::StreamResult;
pub use config::CompletionsApiConfig;
pub use error::CompletionsApiError;
pub use events::{CompletionStreamEvent, FinishReason};
pub use payload::{ChatCompletionsRequest, RequestMessage};
pub use sse::SseStreamParser;
pub use url::normalize_completions_url;
