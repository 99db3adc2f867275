use serde::{Deserialize, Serialize};

/// API key value shipped in fresh settings; the client forces the settings
/// screen until it is replaced.
pub const PLACEHOLDER_API_KEY: &str = "enter-key-here";

/// User settings persisted as `settings.json`.
///
/// The serialized key names are part of the on-disk contract and predate
/// this crate; they stay stable so existing settings files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "ApiKey")]
    pub api_key: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "FrequencyPenalty")]
    pub frequency_penalty: f64,
    #[serde(rename = "PresencePenalty")]
    pub presence_penalty: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: "https://api.deepseek.com".to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 1.0,
            frequency_penalty: 0.2,
            presence_penalty: 0.2,
        }
    }
}

/// One editable settings entry, used by the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Url,
    ApiKey,
    Model,
    Temperature,
    FrequencyPenalty,
    PresencePenalty,
}

impl SettingsField {
    /// All fields in display order.
    pub const ALL: [Self; 6] = [
        Self::Url,
        Self::ApiKey,
        Self::Model,
        Self::Temperature,
        Self::FrequencyPenalty,
        Self::PresencePenalty,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::ApiKey => "ApiKey",
            Self::Model => "Model",
            Self::Temperature => "Temperature",
            Self::FrequencyPenalty => "FrequencyPenalty",
            Self::PresencePenalty => "PresencePenalty",
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Temperature | Self::FrequencyPenalty | Self::PresencePenalty
        )
    }
}

impl Settings {
    /// True while the API key is still the shipped placeholder.
    #[must_use]
    pub fn needs_setup(&self) -> bool {
        self.api_key == PLACEHOLDER_API_KEY
    }

    #[must_use]
    pub fn value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::Url => self.url.clone(),
            SettingsField::ApiKey => self.api_key.clone(),
            SettingsField::Model => self.model.clone(),
            SettingsField::Temperature => self.temperature.to_string(),
            SettingsField::FrequencyPenalty => self.frequency_penalty.to_string(),
            SettingsField::PresencePenalty => self.presence_penalty.to_string(),
        }
    }

    /// Applies user input to one field. Numeric fields reject values that do
    /// not parse; returns whether the settings changed.
    pub fn apply(&mut self, field: SettingsField, input: &str) -> bool {
        if input.is_empty() {
            return false;
        }

        match field {
            SettingsField::Url => self.url = input.to_string(),
            SettingsField::ApiKey => self.api_key = input.to_string(),
            SettingsField::Model => self.model = input.to_string(),
            SettingsField::Temperature => match input.parse() {
                Ok(value) => self.temperature = value,
                Err(_) => return false,
            },
            SettingsField::FrequencyPenalty => match input.parse() {
                Ok(value) => self.frequency_penalty = value,
                Err(_) => return false,
            },
            SettingsField::PresencePenalty => match input.parse() {
                Ok(value) => self.presence_penalty = value,
                Err(_) => return false,
            },
        }

        true
    }
}
