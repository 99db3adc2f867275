//! Chat loader: pick a saved chat to resume, or a system-prompt preset for
//! a new one.

use std::io::{self, Write};
use std::path::PathBuf;

use chat_store::{display_name, DEFAULT_SYSTEM_PROMPT};
use conversation_tree::ChatSession;

use crate::render::{rule, selectable_row, BOLD_WHITE};
use crate::screens::{AppContext, Screen, Transition};
use crate::term::{clear_screen, terminal_width, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoaderMode {
    /// Selecting a saved chat.
    Load,
    /// Selecting a system-prompt preset for a new chat.
    New,
}

pub struct LoaderScreen {
    mode: LoaderMode,
    files: Vec<PathBuf>,
    index: usize,
}

impl LoaderScreen {
    /// Starts in Load mode, or directly in New mode when no chats exist.
    pub fn new(ctx: &AppContext) -> anyhow::Result<Self> {
        let chats = ctx.store.list_chats()?;
        if chats.is_empty() {
            Ok(Self {
                mode: LoaderMode::New,
                files: ctx.store.list_prompts()?,
                index: 0,
            })
        } else {
            Ok(Self {
                mode: LoaderMode::Load,
                files: chats,
                index: 0,
            })
        }
    }

    pub fn render(&self, _ctx: &AppContext) -> io::Result<()> {
        clear_screen()?;
        let width = terminal_width();
        let mut stdout = io::stdout();

        for (row, file) in self.files.iter().enumerate() {
            write!(
                stdout,
                "{}",
                selectable_row(&display_name(file), row == self.index)
            )?;
        }
        if self.files.is_empty() && self.mode == LoaderMode::New {
            write!(stdout, "(no prompt presets; enter starts a default chat)\r\n")?;
        }

        write!(stdout, "{}", rule(BOLD_WHITE, width))?;
        let hint = match self.mode {
            LoaderMode::Load => "Select chat to load, or press 'n' to start a new chat.",
            LoaderMode::New => "Select system prompt for the new chat. Esc returns to chats.",
        };
        write!(stdout, "{hint}\r\n")?;
        stdout.flush()
    }

    pub fn handle_key(&mut self, key: Key, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match key {
            Key::Up => {
                self.index = self.index.saturating_sub(1);
                Ok(Transition::Stay)
            }
            Key::Down => {
                self.index = (self.index + 1).min(self.files.len().saturating_sub(1));
                Ok(Transition::Stay)
            }
            Key::Enter => self.select(ctx),
            Key::Char('n') if self.mode == LoaderMode::Load => {
                self.mode = LoaderMode::New;
                self.files = ctx.store.list_prompts()?;
                self.index = 0;
                Ok(Transition::Stay)
            }
            Key::Escape if self.mode == LoaderMode::New => {
                self.mode = LoaderMode::Load;
                self.files = ctx.store.list_chats()?;
                self.index = 0;
                Ok(Transition::Stay)
            }
            _ => Ok(Transition::Stay),
        }
    }

    fn select(&mut self, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match self.mode {
            LoaderMode::Load => {
                let Some(path) = self.files.get(self.index).cloned() else {
                    return Ok(Transition::Stay);
                };
                match ctx.store.load_chat(&path) {
                    Ok((tree, current)) => {
                        ctx.session = ChatSession::from_parts(tree, current)?;
                        ctx.chat_path = Some(path);
                    }
                    Err(error) if error.is_malformed_document() => {
                        // A corrupt document is rejected wholesale; fall back
                        // to a fresh conversation rather than a partial tree.
                        tracing::warn!(%error, "chat file is malformed; starting fresh");
                        ctx.session = ChatSession::new(DEFAULT_SYSTEM_PROMPT)?;
                        ctx.chat_path = None;
                    }
                    Err(error) => return Err(error.into()),
                }
                Ok(Transition::Switch(Screen::chat()))
            }
            LoaderMode::New => {
                let prompt = match self.files.get(self.index) {
                    Some(path) => ctx.store.load_prompt(path)?,
                    None => DEFAULT_SYSTEM_PROMPT.to_string(),
                };
                ctx.session = ChatSession::new(prompt)?;
                ctx.chat_path = None;
                Ok(Transition::Switch(Screen::chat()))
            }
        }
    }
}
