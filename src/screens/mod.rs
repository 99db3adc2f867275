//! Screen state machine: one active screen owns the keyboard until it
//! yields a transition. Shared session state lives in [`AppContext`] and is
//! handed to whichever screen is active.

use std::io;
use std::path::PathBuf;

use chat_provider::ChatProvider;
use chat_store::{ChatStore, Settings};
use conversation_tree::ChatSession;

use crate::providers::provider_from_settings;
use crate::term::Key;

mod chat;
mod loader;
mod save;
mod settings;

pub use chat::ChatScreen;
pub use loader::LoaderScreen;
pub use save::SaveScreen;
pub use settings::SettingsScreen;

/// State shared by every screen: storage, settings, the provider connection,
/// and the open conversation.
pub struct AppContext {
    pub store: ChatStore,
    pub settings: Settings,
    pub provider: Box<dyn ChatProvider>,
    pub session: ChatSession,
    /// Backing file of the open chat; `None` until first saved.
    pub chat_path: Option<PathBuf>,
}

impl AppContext {
    /// Rebuilds the provider connection after a settings change.
    pub fn reconnect(&mut self) -> anyhow::Result<()> {
        self.provider = provider_from_settings(&self.settings)?;
        Ok(())
    }
}

/// What a key handler asks the main loop to do next.
pub enum Transition {
    Stay,
    Switch(Screen),
    Exit,
}

pub enum Screen {
    Chat(ChatScreen),
    Loader(LoaderScreen),
    Save(SaveScreen),
    Settings(SettingsScreen),
}

impl Screen {
    #[must_use]
    pub fn chat() -> Self {
        Self::Chat(ChatScreen)
    }

    #[must_use]
    pub fn settings(draft: Settings) -> Self {
        Self::Settings(SettingsScreen::new(draft))
    }

    pub fn loader(ctx: &AppContext) -> anyhow::Result<Self> {
        Ok(Self::Loader(LoaderScreen::new(ctx)?))
    }

    /// Repaints the whole screen for the current state.
    pub fn render(&self, ctx: &AppContext) -> io::Result<()> {
        match self {
            Self::Chat(screen) => screen.render(ctx),
            Self::Loader(screen) => screen.render(ctx),
            Self::Save(screen) => screen.render(ctx),
            Self::Settings(screen) => screen.render(ctx),
        }
    }

    /// Routes one key press to the active screen.
    pub fn handle_key(&mut self, key: Key, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match self {
            Self::Chat(screen) => screen.handle_key(key, ctx),
            Self::Loader(screen) => screen.handle_key(key, ctx),
            Self::Save(screen) => screen.handle_key(key, ctx),
            Self::Settings(screen) => screen.handle_key(key, ctx),
        }
    }
}
