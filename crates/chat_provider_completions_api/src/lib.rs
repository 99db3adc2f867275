//! Chat-completions-backed implementation of the shared `chat_provider`
//! contract.
//!
//! This adapter translates `completions_api` stream semantics into the
//! blocking `ChatProvider::generate` call expected by the session: deltas
//! are forwarded to `on_chunk` as they arrive and the assembled content is
//! returned once the stream terminates.

use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    ChatMessage, ChatProvider, GenerationError, ProviderInitError, ProviderProfile,
};
use completions_api::{
    ChatCompletionsRequest, CompletionsApiClient, CompletionsApiConfig, CompletionsApiError,
    CompletionStreamEvent, FinishReason, RequestMessage,
};

/// Stable provider identifier used by startup selection.
pub const COMPLETIONS_API_PROVIDER_ID: &str = "completions-api";

/// Runtime configuration for the chat-completions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionsProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model_id: String,
    pub temperature: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub timeout: Option<Duration>,
}

impl CompletionsProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model_id: model_id.into(),
            temperature: None,
            frequency_penalty: None,
            presence_penalty: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_frequency_penalty(mut self, frequency_penalty: f64) -> Self {
        self.frequency_penalty = Some(frequency_penalty);
        self
    }

    #[must_use]
    pub fn with_presence_penalty(mut self, presence_penalty: f64) -> Self {
        self.presence_penalty = Some(presence_penalty);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> CompletionsApiConfig {
        let mut config = CompletionsApiConfig::new(self.api_key);
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

trait StreamClient: Send + Sync {
    fn stream(
        &self,
        request: &ChatCompletionsRequest,
        on_event: &mut dyn FnMut(CompletionStreamEvent),
    ) -> Result<Option<FinishReason>, CompletionsApiError>;
}

#[derive(Debug)]
struct DefaultStreamClient {
    client: CompletionsApiClient,
}

impl StreamClient for DefaultStreamClient {
    fn stream(
        &self,
        request: &ChatCompletionsRequest,
        on_event: &mut dyn FnMut(CompletionStreamEvent),
    ) -> Result<Option<FinishReason>, CompletionsApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                CompletionsApiError::Unknown(format!(
                    "failed to initialize tokio runtime: {error}"
                ))
            })?;

        runtime.block_on(
            self.client
                .stream_with_handler(request, |event| on_event(event)),
        )
    }
}

/// `ChatProvider` adapter backed by `completions_api` transport primitives.
pub struct CompletionsApiProvider {
    model_id: String,
    temperature: Option<f64>,
    frequency_penalty: Option<f64>,
    presence_penalty: Option<f64>,
    stream_client: Arc<dyn StreamClient>,
}

impl CompletionsApiProvider {
    /// Creates a provider using real chat-completions transport.
    pub fn new(config: CompletionsProviderConfig) -> Result<Self, ProviderInitError> {
        let model_id = config.model_id.clone();
        let temperature = config.temperature;
        let frequency_penalty = config.frequency_penalty;
        let presence_penalty = config.presence_penalty;
        let client =
            CompletionsApiClient::new(config.into_api_config()).map_err(map_init_error)?;

        Ok(Self {
            model_id,
            temperature,
            frequency_penalty,
            presence_penalty,
            stream_client: Arc::new(DefaultStreamClient { client }),
        })
    }

    fn build_request(&self, messages: &[ChatMessage]) -> ChatCompletionsRequest {
        let wire_messages = messages
            .iter()
            .map(|message| RequestMessage::new(message.role.as_str(), message.content.clone()))
            .collect();

        let mut request = ChatCompletionsRequest::new(self.model_id.clone(), wire_messages);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(frequency_penalty) = self.frequency_penalty {
            request = request.with_frequency_penalty(frequency_penalty);
        }
        if let Some(presence_penalty) = self.presence_penalty {
            request = request.with_presence_penalty(presence_penalty);
        }
        request
    }

    #[cfg(test)]
    fn with_stream_client_for_tests(
        model_id: impl Into<String>,
        stream_client: Arc<dyn StreamClient>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: None,
            frequency_penalty: None,
            presence_penalty: None,
            stream_client,
        }
    }
}

impl ChatProvider for CompletionsApiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: COMPLETIONS_API_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn generate(
        &self,
        messages: &[ChatMessage],
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, GenerationError> {
        let request = self.build_request(messages);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat-completions request"
        );

        let mut content = String::new();
        let outcome = self.stream_client.stream(&request, &mut |event| {
            if let CompletionStreamEvent::ContentDelta { delta } = event {
                on_chunk(&delta);
                content.push_str(&delta);
            }
        });

        match outcome {
            Ok(finish) => {
                if content.is_empty() && finish.is_none() {
                    return Err(GenerationError::new(
                        "completion stream ended without content or finish reason",
                    ));
                }
                tracing::debug!(
                    finish = finish.map(|reason| reason.as_str()).unwrap_or("none"),
                    chars = content.len(),
                    "completion stream finished"
                );
                Ok(content)
            }
            Err(error) => Err(GenerationError::new(format!(
                "Completion request failed: {error}"
            ))),
        }
    }
}

fn map_init_error(error: CompletionsApiError) -> ProviderInitError {
    ProviderInitError::new(format!(
        "Failed to initialize completions-api provider: {error}"
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    enum FakeStreamOutcome {
        Events(Vec<CompletionStreamEvent>, Option<FinishReason>),
        Error(CompletionsApiError),
    }

    struct FakeStreamClient {
        observed_request: Mutex<Option<ChatCompletionsRequest>>,
        outcome: Mutex<Option<FakeStreamOutcome>>,
    }

    impl FakeStreamClient {
        fn events(
            events: Vec<CompletionStreamEvent>,
            finish: Option<FinishReason>,
        ) -> Arc<Self> {
            Arc::new(Self {
                observed_request: Mutex::new(None),
                outcome: Mutex::new(Some(FakeStreamOutcome::Events(events, finish))),
            })
        }

        fn failure(error: CompletionsApiError) -> Arc<Self> {
            Arc::new(Self {
                observed_request: Mutex::new(None),
                outcome: Mutex::new(Some(FakeStreamOutcome::Error(error))),
            })
        }

        fn observed_request(&self) -> Option<ChatCompletionsRequest> {
            self.observed_request
                .lock()
                .expect("observed request lock")
                .clone()
        }
    }

    impl StreamClient for FakeStreamClient {
        fn stream(
            &self,
            request: &ChatCompletionsRequest,
            on_event: &mut dyn FnMut(CompletionStreamEvent),
        ) -> Result<Option<FinishReason>, CompletionsApiError> {
            *self
                .observed_request
                .lock()
                .expect("observed request lock") = Some(request.clone());

            match self
                .outcome
                .lock()
                .expect("outcome lock")
                .take()
                .expect("fake stream outcome consumed exactly once")
            {
                FakeStreamOutcome::Events(events, finish) => {
                    for event in events {
                        on_event(event);
                    }
                    Ok(finish)
                }
                FakeStreamOutcome::Error(error) => Err(error),
            }
        }
    }

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(chat_provider::Role::System, "be brief"),
            ChatMessage::new(chat_provider::Role::User, "hi"),
        ]
    }

    #[test]
    fn generate_streams_deltas_in_order_and_assembles_content() {
        let provider = CompletionsApiProvider::with_stream_client_for_tests(
            "deepseek-chat",
            FakeStreamClient::events(
                vec![
                    CompletionStreamEvent::ContentDelta {
                        delta: "Hel".to_string(),
                    },
                    CompletionStreamEvent::ContentDelta {
                        delta: "lo".to_string(),
                    },
                    CompletionStreamEvent::Completed {
                        finish_reason: Some(FinishReason::Stop),
                    },
                ],
                Some(FinishReason::Stop),
            ),
        );

        let mut streamed = Vec::new();
        let content = provider
            .generate(&history(), &mut |chunk| streamed.push(chunk.to_string()))
            .expect("streamed completion succeeds");

        assert_eq!(streamed, vec!["Hel", "lo"]);
        assert_eq!(content, "Hello");
    }

    #[test]
    fn request_carries_wire_roles_for_the_full_history() {
        let client = FakeStreamClient::events(Vec::new(), Some(FinishReason::Stop));
        let provider = CompletionsApiProvider::with_stream_client_for_tests(
            "deepseek-chat",
            Arc::clone(&client) as Arc<dyn StreamClient>,
        );

        provider
            .generate(&history(), &mut |_| {})
            .expect("empty completion with finish reason succeeds");

        let observed = client.observed_request().expect("request was sent");
        assert_eq!(observed.model, "deepseek-chat");
        assert_eq!(observed.messages.len(), 2);
        assert_eq!(observed.messages[0].role, "system");
        assert_eq!(observed.messages[1].role, "user");
        assert_eq!(observed.messages[1].content, "hi");
        assert!(observed.stream);
    }

    #[test]
    fn transport_error_maps_to_generation_error() {
        let provider = CompletionsApiProvider::with_stream_client_for_tests(
            "deepseek-chat",
            FakeStreamClient::failure(CompletionsApiError::Unknown("boom".to_string())),
        );

        let error = provider
            .generate(&history(), &mut |_| {})
            .expect_err("transport failure should surface");

        assert!(error.message().contains("Completion request failed"));
        assert!(error.message().contains("boom"));
    }

    #[test]
    fn stream_without_content_or_finish_is_a_failure() {
        let provider = CompletionsApiProvider::with_stream_client_for_tests(
            "deepseek-chat",
            FakeStreamClient::events(Vec::new(), None),
        );

        let error = provider
            .generate(&history(), &mut |_| {})
            .expect_err("empty stream should surface");

        assert!(error.message().contains("without content"));
    }

    #[test]
    fn profile_reports_provider_id_and_model() {
        let provider = CompletionsApiProvider::with_stream_client_for_tests(
            "deepseek-chat",
            FakeStreamClient::events(Vec::new(), Some(FinishReason::Stop)),
        );

        let profile = provider.profile();
        assert_eq!(profile.provider_id, COMPLETIONS_API_PROVIDER_ID);
        assert_eq!(profile.model_id, "deepseek-chat");
    }
}
