//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport logic and is intended for offline runs
//! and contract-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chat_provider::{
    ChatMessage, ChatProvider, GenerationError, ProviderProfile, Role,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// One scripted generation outcome consumed by [`MockChatProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Emit each chunk through `on_chunk`, then return the concatenation.
    Chunks(Vec<String>),
    /// Fail with the given error message.
    Failure(String),
}

impl ScriptedReply {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Chunks(vec![content.into()])
    }
}

/// Deterministic mock provider used by tests and local runs.
///
/// Replies are consumed front-to-back; once the script is exhausted, every
/// further call replays the built-in default reply.
#[derive(Debug)]
pub struct MockChatProvider {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    model_id: String,
}

impl MockChatProvider {
    #[must_use]
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            model_id: "mock-model".to_string(),
        }
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Returns the message histories observed so far, in call order.
    #[must_use]
    pub fn observed_requests(&self) -> Vec<Vec<ChatMessage>> {
        lock_unpoisoned(&self.requests).clone()
    }

    fn default_chunks() -> Vec<String> {
        vec![
            "## Mocked reply\n".to_string(),
            "- This provider streams **deterministic** content.\n".to_string(),
            "- Useful for navigating branches without network access.\n".to_string(),
            "Completed.\n".to_string(),
        ]
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ChatProvider for MockChatProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn generate(
        &self,
        messages: &[ChatMessage],
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, GenerationError> {
        lock_unpoisoned(&self.requests).push(messages.to_vec());

        let reply = lock_unpoisoned(&self.script)
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Chunks(Self::default_chunks()));

        match reply {
            ScriptedReply::Chunks(chunks) => {
                let mut content = String::new();
                for chunk in &chunks {
                    on_chunk(chunk);
                    content.push_str(chunk);
                }
                Ok(content)
            }
            ScriptedReply::Failure(message) => Err(GenerationError::new(message)),
        }
    }
}

/// Convenience constructor for a provider that answers once with `content`.
#[must_use]
pub fn replying_once(content: impl Into<String>) -> MockChatProvider {
    MockChatProvider::new(vec![ScriptedReply::text(content)])
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_reports_mock_provider_id() {
        let provider = MockChatProvider::default().with_model_id("mock-mini");
        let profile = provider.profile();

        assert_eq!(profile.provider_id, MOCK_PROVIDER_ID);
        assert_eq!(profile.model_id, "mock-mini");
    }

    #[test]
    fn scripted_chunks_stream_in_order_and_assemble() {
        let provider = MockChatProvider::new(vec![ScriptedReply::Chunks(vec![
            "Hello".to_string(),
            ", ".to_string(),
            "world".to_string(),
        ])]);

        let mut streamed = Vec::new();
        let content = provider
            .generate(&[ChatMessage::new(Role::User, "hi")], &mut |chunk| {
                streamed.push(chunk.to_string());
            })
            .expect("scripted chunks should succeed");

        assert_eq!(streamed, vec!["Hello", ", ", "world"]);
        assert_eq!(content, "Hello, world");
    }

    #[test]
    fn scripted_failure_surfaces_as_generation_error() {
        let provider =
            MockChatProvider::new(vec![ScriptedReply::Failure("connection refused".to_string())]);

        let error = provider
            .generate(&[ChatMessage::new(Role::User, "hi")], &mut |_| {})
            .expect_err("scripted failure should surface");

        assert_eq!(error.message(), "connection refused");
    }

    #[test]
    fn exhausted_script_falls_back_to_default_reply() {
        let provider = MockChatProvider::new(vec![ScriptedReply::text("first")]);
        let mut sink = |_: &str| {};

        let first = provider
            .generate(&[ChatMessage::new(Role::User, "a")], &mut sink)
            .expect("first scripted reply");
        let second = provider
            .generate(&[ChatMessage::new(Role::User, "b")], &mut sink)
            .expect("fallback reply");

        assert_eq!(first, "first");
        assert!(second.contains("Mocked reply"));
    }

    #[test]
    fn observed_requests_record_full_histories() {
        let provider = MockChatProvider::default();
        let history = vec![
            ChatMessage::new(Role::System, "be brief"),
            ChatMessage::new(Role::User, "hi"),
        ];

        provider
            .generate(&history, &mut |_| {})
            .expect("default reply");

        assert_eq!(provider.observed_requests(), vec![history]);
    }
}
