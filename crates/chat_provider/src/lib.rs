//! Minimal provider-agnostic contract for chat generation.
//!
//! This crate intentionally defines only the shared message model and the
//! blocking generation contract. It excludes provider transport details,
//! protocol payloads, and conversation bookkeeping concerns.

use std::fmt;

/// Message author role recognized by the conversation model and providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Parses the canonical lowercase role name.
    pub fn parse(value: &str) -> Result<Self, InvalidRole> {
        match value {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(InvalidRole::new(other)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a role name outside `system | user | assistant` is
/// encountered, e.g. while reading a persisted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRole {
    role: String,
}

impl InvalidRole {
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    /// Returns the unrecognized role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized message role '{}'", self.role)
    }
}

impl std::error::Error for InvalidRole {}

/// Provider-facing message item: one `(role, content)` pair of the payload
/// handed to `ChatProvider::generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Error returned while constructing/configuring a provider before any
/// generation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error describing a failed generation attempt.
///
/// Callers record the message as visible conversation content rather than
/// aborting the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    message: String,
}

impl GenerationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GenerationError {}

impl From<String> for GenerationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for GenerationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Immutable metadata describing a generation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one blocking generation request.
pub trait ChatProvider: Send + Sync {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Generates a reply for the ordered message history.
    ///
    /// Blocks until the provider terminates. Partial output is surfaced
    /// through `on_chunk` in arrival order; the returned string is the
    /// assembled content and equals the concatenation of emitted chunks.
    fn generate(
        &self,
        messages: &[ChatMessage],
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::{
        ChatMessage, ChatProvider, GenerationError, InvalidRole, ProviderInitError,
        ProviderProfile, Role,
    };

    struct MinimalProvider;

    impl ChatProvider for MinimalProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "minimal".to_string(),
                model_id: "minimal-model".to_string(),
            }
        }

        fn generate(
            &self,
            _messages: &[ChatMessage],
            on_chunk: &mut dyn FnMut(&str),
        ) -> Result<String, GenerationError> {
            on_chunk("ok");
            Ok("ok".to_string())
        }
    }

    #[test]
    fn role_parse_accepts_canonical_names() {
        assert_eq!(Role::parse("system"), Ok(Role::System));
        assert_eq!(Role::parse("user"), Ok(Role::User));
        assert_eq!(Role::parse("assistant"), Ok(Role::Assistant));
    }

    #[test]
    fn role_parse_rejects_unknown_names() {
        let error = Role::parse("moderator").expect_err("unknown roles should fail");
        assert_eq!(error.role(), "moderator");
        assert_eq!(error.to_string(), "unrecognized message role 'moderator'");
    }

    #[test]
    fn role_round_trips_through_as_str() {
        for role in [Role::System, Role::User, Role::Assistant] {
            assert_eq!(Role::parse(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing api key");
        assert_eq!(error.message(), "missing api key");
        assert_eq!(error.to_string(), "missing api key");
    }

    #[test]
    fn generation_error_preserves_message() {
        let error = GenerationError::from("HTTP 401 invalid key".to_string());
        assert_eq!(error.message(), "HTTP 401 invalid key");
        assert_eq!(error.to_string(), "HTTP 401 invalid key");
    }

    #[test]
    fn generate_streams_chunks_and_returns_assembled_content() {
        let provider = MinimalProvider;
        let mut streamed = String::new();

        let content = provider
            .generate(
                &[ChatMessage::new(Role::User, "hi")],
                &mut |chunk| streamed.push_str(chunk),
            )
            .expect("minimal provider should succeed");

        assert_eq!(content, "ok");
        assert_eq!(streamed, content);
    }
}
