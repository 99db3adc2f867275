//! Save prompt shown before leaving a chat, either to open another one or
//! to quit.

use std::io::{self, Write};

use crate::input::read_line;
use crate::screens::{AppContext, Screen, Transition};
use crate::term::{clear_screen, Key};

pub struct SaveScreen {
    /// After saving (or declining), continue to the loader instead of
    /// quitting.
    continue_after: bool,
}

impl SaveScreen {
    #[must_use]
    pub fn new(continue_after: bool) -> Self {
        Self { continue_after }
    }

    pub fn render(&self, _ctx: &AppContext) -> io::Result<()> {
        clear_screen()?;
        let mut stdout = io::stdout();
        write!(stdout, "Do you want to save the current chat? [y/n]\r\n")?;
        stdout.flush()
    }

    pub fn handle_key(&mut self, key: Key, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match key {
            Key::Char('y') | Key::Enter => self.save(ctx),
            Key::Char('n') => self.after_save(ctx),
            _ => Ok(Transition::Stay),
        }
    }

    fn save(&self, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        let path = match &ctx.chat_path {
            Some(path) => path.clone(),
            None => {
                // A never-saved chat needs a file name; a timestamp is the
                // offered default. Escape returns to the prompt.
                let default_name = ctx.store.default_chat_name()?;
                let Some(name) = read_line("Name for chat file: ", &default_name)? else {
                    return Ok(Transition::Stay);
                };
                let name = name.trim();
                if name.is_empty() {
                    return Ok(Transition::Stay);
                }
                ctx.store.chat_path_for_name(name)
            }
        };

        ctx.store
            .save_chat(&path, ctx.session.tree(), ctx.session.current_id())?;
        ctx.chat_path = Some(path);
        self.after_save(ctx)
    }

    fn after_save(&self, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        if self.continue_after {
            Ok(Transition::Switch(Screen::loader(ctx)?))
        } else {
            Ok(Transition::Exit)
        }
    }
}
