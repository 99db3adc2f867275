//! Filesystem storage for the terminal client: saved chats, system-prompt
//! presets, and user settings, all under one platform config directory.
//!
//! Chat documents are written through the `conversation_tree` codec, so a
//! load restores the exact tree plus the node that was current at save
//! time. A corrupt document is rejected wholesale; callers fall back to a
//! fresh conversation instead of trusting a partial tree.

mod error;
mod paths;
mod settings;
mod store;

pub use error::ChatStoreError;
pub use paths::{
    default_config_root, display_name, file_timestamp, APP_DIR_NAME, CHATS_DIR_NAME,
    LOGS_DIR_NAME, PROMPTS_DIR_NAME, SETTINGS_FILE_NAME,
};
pub use settings::{Settings, SettingsField, PLACEHOLDER_API_KEY};
pub use store::{ChatStore, LoadedChat, DEFAULT_SYSTEM_PROMPT};
