use anyhow::Context;
use arbor::screens::{AppContext, Screen, Transition};
use arbor::{logging, providers, term};
use chat_store::{ChatStore, LoadedChat, Settings, DEFAULT_SYSTEM_PROMPT};
use conversation_tree::ChatSession;

fn main() -> anyhow::Result<()> {
    let store = ChatStore::open_default().context("opening the chat store")?;
    let _log_guard = logging::init(&store.logs_dir());
    tracing::info!(root = %store.root().display(), "starting arbor");

    let settings = match store.load_settings() {
        Ok(settings) => settings,
        Err(error) => {
            tracing::warn!(%error, "settings file is unreadable; using defaults");
            Settings::default()
        }
    };

    let loaded = match store.load_recent() {
        Ok(loaded) => loaded,
        Err(error) if error.is_malformed_document() => {
            tracing::warn!(%error, "most recent chat is malformed; starting fresh");
            fresh_chat()?
        }
        Err(error) => return Err(error).context("loading the most recent chat"),
    };
    let session =
        ChatSession::from_parts(loaded.tree, loaded.current).context("restoring the session")?;

    let provider = providers::provider_from_settings(&settings)?;
    let mut ctx = AppContext {
        store,
        settings,
        provider,
        session,
        chat_path: loaded.path,
    };

    let _raw_mode = term::RawModeGuard::new().context("enabling raw terminal mode")?;

    // First run lands on the settings screen until an API key is entered.
    let mut screen = if ctx.settings.needs_setup() {
        Screen::settings(ctx.settings.clone())
    } else {
        Screen::chat()
    };
    screen.render(&ctx)?;

    loop {
        let key = term::read_key()?;
        match screen.handle_key(key, &mut ctx)? {
            Transition::Stay => screen.render(&ctx)?,
            Transition::Switch(next) => {
                screen = next;
                screen.render(&ctx)?;
            }
            Transition::Exit => break,
        }
    }

    term::clear_screen()?;
    tracing::info!("session ended");
    Ok(())
}

fn fresh_chat() -> anyhow::Result<LoadedChat> {
    let timestamp = conversation_tree::now_timestamp().context("formatting the clock")?;
    Ok(LoadedChat {
        tree: conversation_tree::MessageTree::new(
            chat_provider::Role::System,
            DEFAULT_SYSTEM_PROMPT,
            timestamp,
        ),
        current: None,
        path: None,
    })
}
