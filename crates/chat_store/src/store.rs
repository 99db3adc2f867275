use std::fs;
use std::path::{Path, PathBuf};

use chat_provider::Role;
use conversation_tree::{codec, now_timestamp, MessageTree, NodeId};

use crate::error::ChatStoreError;
use crate::paths::{
    default_config_root, display_name, file_timestamp, CHATS_DIR_NAME, LOGS_DIR_NAME,
    PROMPTS_DIR_NAME, SETTINGS_FILE_NAME,
};
use crate::settings::Settings;

/// System prompt used when no prompt presets exist yet.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer concisely and use markdown where it helps.";

/// A chat loaded from disk (or started fresh when none existed).
#[derive(Debug)]
pub struct LoadedChat {
    pub tree: MessageTree,
    pub current: Option<NodeId>,
    /// The backing file; `None` for a fresh, never-saved conversation.
    pub path: Option<PathBuf>,
}

/// Filesystem access for saved chats, prompt presets, and settings, rooted
/// at one directory so tests can point it at a scratch location.
#[derive(Debug, Clone)]
pub struct ChatStore {
    root: PathBuf,
}

impl ChatStore {
    /// Opens the store under the platform config directory, creating the
    /// directory layout when missing.
    pub fn open_default() -> Result<Self, ChatStoreError> {
        let root = default_config_root().ok_or(ChatStoreError::NoConfigDir)?;
        Self::at(root)
    }

    /// Opens a store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self, ChatStoreError> {
        let store = Self { root: root.into() };
        for dir in [store.chats_dir(), store.prompts_dir(), store.logs_dir()] {
            fs::create_dir_all(&dir)
                .map_err(|source| ChatStoreError::io("creating store directory", &dir, source))?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn chats_dir(&self) -> PathBuf {
        self.root.join(CHATS_DIR_NAME)
    }

    #[must_use]
    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join(PROMPTS_DIR_NAME)
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR_NAME)
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    /// Paths of all saved chats, sorted by file name for stable listings.
    pub fn list_chats(&self) -> Result<Vec<PathBuf>, ChatStoreError> {
        self.list_files_with_extension(&self.chats_dir(), "json")
    }

    /// Paths of all prompt presets, sorted by file name.
    pub fn list_prompts(&self) -> Result<Vec<PathBuf>, ChatStoreError> {
        self.list_files_with_extension(&self.prompts_dir(), "txt")
    }

    /// The most recently modified saved chat, if any exist.
    pub fn most_recent_chat(&self) -> Result<Option<PathBuf>, ChatStoreError> {
        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

        for path in self.list_chats()? {
            let metadata = fs::metadata(&path)
                .map_err(|source| ChatStoreError::io("reading chat metadata", &path, source))?;
            let modified = metadata
                .modified()
                .map_err(|source| ChatStoreError::io("reading chat mtime", &path, source))?;

            let is_newer = newest
                .as_ref()
                .map(|(time, _)| modified > *time)
                .unwrap_or(true);
            if is_newer {
                newest = Some((modified, path));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }

    /// Reads one saved chat, returning the tree and the persisted current
    /// node (or `None` when `cur_id` matches nothing).
    pub fn load_chat(&self, path: &Path) -> Result<(MessageTree, Option<NodeId>), ChatStoreError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ChatStoreError::io("reading chat file", path, source))?;
        let loaded = codec::from_json(&text).map_err(|source| ChatStoreError::codec(path, source))?;

        tracing::debug!(path = %path.display(), nodes = loaded.0.len(), "loaded chat");
        Ok(loaded)
    }

    /// Writes the tree plus its current node to `path` as pretty JSON.
    pub fn save_chat(
        &self,
        path: &Path,
        tree: &MessageTree,
        current: &NodeId,
    ) -> Result<(), ChatStoreError> {
        let json = codec::to_json_pretty(tree, current)
            .map_err(|source| ChatStoreError::codec(path, source))?;
        fs::write(path, json)
            .map_err(|source| ChatStoreError::io("writing chat file", path, source))?;

        tracing::debug!(path = %path.display(), nodes = tree.len(), "saved chat");
        Ok(())
    }

    /// Path for a chat saved under a user-chosen name.
    #[must_use]
    pub fn chat_path_for_name(&self, name: &str) -> PathBuf {
        self.chats_dir().join(format!("{name}.json"))
    }

    /// Timestamp-based default name offered when saving a fresh chat.
    pub fn default_chat_name(&self) -> Result<String, ChatStoreError> {
        file_timestamp().map_err(ChatStoreError::ClockFormat)
    }

    /// Reads one prompt preset.
    pub fn load_prompt(&self, path: &Path) -> Result<String, ChatStoreError> {
        fs::read_to_string(path)
            .map_err(|source| ChatStoreError::io("reading prompt file", path, source))
    }

    /// Loads the most recently modified chat, or starts a fresh conversation
    /// from the default system prompt when no chats exist.
    pub fn load_recent(&self) -> Result<LoadedChat, ChatStoreError> {
        match self.most_recent_chat()? {
            Some(path) => {
                let (tree, current) = self.load_chat(&path)?;
                Ok(LoadedChat {
                    tree,
                    current,
                    path: Some(path),
                })
            }
            None => {
                let timestamp = now_timestamp().map_err(ChatStoreError::ClockFormat)?;
                let tree = MessageTree::new(Role::System, DEFAULT_SYSTEM_PROMPT, timestamp);
                Ok(LoadedChat {
                    tree,
                    current: None,
                    path: None,
                })
            }
        }
    }

    /// Loads settings, falling back to defaults when the file is absent.
    pub fn load_settings(&self) -> Result<Settings, ChatStoreError> {
        let path = self.settings_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(source) => return Err(ChatStoreError::io("reading settings file", &path, source)),
        };

        serde_json::from_str(&text)
            .map_err(|source| ChatStoreError::SettingsParse { path, source })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), ChatStoreError> {
        let path = self.settings_path();
        let json = serde_json::to_string_pretty(settings)
            .map_err(ChatStoreError::SettingsSerialize)?;
        fs::write(&path, json)
            .map_err(|source| ChatStoreError::io("writing settings file", &path, source))
    }

    /// Removes the settings file; the next load returns defaults.
    pub fn delete_settings(&self) -> Result<(), ChatStoreError> {
        let path = self.settings_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ChatStoreError::io("removing settings file", &path, source)),
        }
    }

    fn list_files_with_extension(
        &self,
        dir: &Path,
        extension: &str,
    ) -> Result<Vec<PathBuf>, ChatStoreError> {
        let entries = fs::read_dir(dir)
            .map_err(|source| ChatStoreError::io("listing store directory", dir, source))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|source| ChatStoreError::io("listing store directory", dir, source))?;
            let path = entry.path();
            if path.extension().and_then(|value| value.to_str()) == Some(extension) {
                files.push(path);
            }
        }

        files.sort_by_key(|path| display_name(path));
        Ok(files)
    }
}
