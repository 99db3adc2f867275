use std::path::PathBuf;

use conversation_tree::codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read chat document {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    SettingsSerialize(#[source] serde_json::Error),

    #[error("no platform config directory is available")]
    NoConfigDir,

    #[error("failed to format current timestamp: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl ChatStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn codec(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::Codec {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is a malformed or foreign document,
    /// i.e. the caller should fall back to a fresh conversation.
    #[must_use]
    pub fn is_malformed_document(&self) -> bool {
        matches!(self, Self::Codec { .. })
    }
}
