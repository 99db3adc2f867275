//! Provider bootstrap: maps user settings to a `ChatProvider`.
//!
//! `ARBOR_PROVIDER=mock` selects the deterministic mock provider for
//! offline runs and tests; anything else (including unset) uses the
//! chat-completions transport configured by the settings file.

use chat_provider::{ChatProvider, ProviderInitError};
use chat_provider_completions_api::{CompletionsApiProvider, CompletionsProviderConfig};
use chat_provider_mock::{MockChatProvider, MOCK_PROVIDER_ID};
use chat_store::Settings;

pub const PROVIDER_ENV_VAR: &str = "ARBOR_PROVIDER";

pub fn provider_from_settings(
    settings: &Settings,
) -> Result<Box<dyn ChatProvider>, ProviderInitError> {
    let provider_id = std::env::var(PROVIDER_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    if provider_id.as_deref() == Some(MOCK_PROVIDER_ID) {
        return Ok(Box::new(MockChatProvider::default()));
    }

    let config = CompletionsProviderConfig::new(settings.api_key.clone(), settings.model.clone())
        .with_base_url(settings.url.clone())
        .with_temperature(settings.temperature)
        .with_frequency_penalty(settings.frequency_penalty)
        .with_presence_penalty(settings.presence_penalty);

    let provider = CompletionsApiProvider::new(config)?;
    tracing::info!(
        model = %settings.model,
        url = %settings.url,
        "connected chat-completions provider"
    );
    Ok(Box::new(provider))
}
