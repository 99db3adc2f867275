//! The main screen, where conversations take place.

use std::io::{self, Write};

use conversation_tree::Command;

use crate::input::read_line;
use crate::render::{render_chat, to_terminal_lines};
use crate::screens::{AppContext, SaveScreen, Screen, Transition};
use crate::term::{clear_screen, terminal_width, Key};

pub struct ChatScreen;

impl ChatScreen {
    pub fn render(&self, ctx: &AppContext) -> io::Result<()> {
        clear_screen()?;
        let mut stdout = io::stdout();
        write!(stdout, "{}", render_chat(&ctx.session, terminal_width()))?;
        stdout.flush()
    }

    pub fn handle_key(&mut self, key: Key, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match key {
            Key::Char('q') | Key::CtrlC => {
                Ok(Transition::Switch(Screen::Save(SaveScreen::new(false))))
            }
            Key::Char('c') => Ok(Transition::Switch(Screen::Save(SaveScreen::new(true)))),
            Key::Char('s') => Ok(Transition::Switch(Screen::settings(ctx.settings.clone()))),
            Key::Char('e') => self.edit_current(ctx),
            Key::Enter => self.type_message(ctx),
            Key::Up => self.dispatch(ctx, Command::MoveUp),
            Key::Down => self.dispatch(ctx, Command::MoveDown),
            Key::Left => self.dispatch(ctx, Command::MoveLeft),
            Key::Right => self.dispatch(ctx, Command::MoveRight),
            _ => Ok(Transition::Stay),
        }
    }

    /// Runs one session command, streaming any generated tokens to the
    /// terminal as they arrive. The full view is repainted afterwards by
    /// the main loop.
    fn dispatch(&self, ctx: &mut AppContext, command: Command) -> anyhow::Result<Transition> {
        let mut painting_stream = false;
        ctx.session
            .dispatch(command, ctx.provider.as_ref(), &mut |chunk| {
                if !painting_stream {
                    painting_stream = true;
                    let _ = clear_screen();
                }
                let mut stdout = io::stdout();
                let _ = write!(stdout, "{}", to_terminal_lines(chunk));
                let _ = stdout.flush();
            })?;
        Ok(Transition::Stay)
    }

    /// Lets the user type a new message; cancelling (or submitting nothing)
    /// leaves the conversation untouched.
    fn type_message(&self, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match read_line("> ", "")? {
            Some(text) if !text.trim().is_empty() => {
                self.dispatch(ctx, Command::TypeMessage(text))
            }
            _ => Ok(Transition::Stay),
        }
    }

    /// Lets the user rewrite the current message, branching a sibling. The
    /// system root is not editable; escape restores the previous state.
    fn edit_current(&self, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        if ctx.session.current().is_root() {
            return Ok(Transition::Stay);
        }

        let previous_text = ctx.session.current().content().to_string();
        match read_line("> ", &previous_text)? {
            Some(text) if !text.trim().is_empty() => {
                self.dispatch(ctx, Command::EditCurrent(text))
            }
            _ => Ok(Transition::Stay),
        }
    }
}
