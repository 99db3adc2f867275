//! Settings screen: edit, save, or reset the provider configuration.

use std::io::{self, Write};

use chat_store::{Settings, SettingsField};

use crate::input::read_line;
use crate::render::{rule, rule_with_header, selectable_row, BOLD_WHITE};
use crate::screens::{AppContext, Screen, Transition};
use crate::term::{clear_screen, terminal_width, Key};

pub struct SettingsScreen {
    draft: Settings,
    index: usize,
}

impl SettingsScreen {
    #[must_use]
    pub fn new(draft: Settings) -> Self {
        Self { draft, index: 0 }
    }

    pub fn render(&self, _ctx: &AppContext) -> io::Result<()> {
        clear_screen()?;
        let width = terminal_width();
        let mut stdout = io::stdout();

        write!(stdout, "{}", rule_with_header("Settings", BOLD_WHITE, width))?;
        for (row, field) in SettingsField::ALL.iter().enumerate() {
            let label = format!("{}: {}", field.label(), self.draft.value(*field));
            write!(stdout, "{}", selectable_row(&label, row == self.index))?;
        }
        write!(stdout, "{}", rule(BOLD_WHITE, width))?;
        write!(
            stdout,
            "Arrow Keys: Navigate | Enter: Edit | 's': Save & Return | 'r': Reset.\r\n"
        )?;
        stdout.flush()
    }

    pub fn handle_key(&mut self, key: Key, ctx: &mut AppContext) -> anyhow::Result<Transition> {
        match key {
            Key::Up => {
                self.index = self.index.saturating_sub(1);
                Ok(Transition::Stay)
            }
            Key::Down => {
                self.index = (self.index + 1).min(SettingsField::ALL.len() - 1);
                Ok(Transition::Stay)
            }
            Key::Enter => {
                self.edit_selected()?;
                Ok(Transition::Stay)
            }
            Key::Char('s') => {
                ctx.store.save_settings(&self.draft)?;
                ctx.settings = self.draft.clone();
                ctx.reconnect()?;
                Ok(Transition::Switch(Screen::chat()))
            }
            Key::Char('r') => {
                ctx.store.delete_settings()?;
                self.draft = Settings::default();
                self.index = 0;
                Ok(Transition::Stay)
            }
            _ => Ok(Transition::Stay),
        }
    }

    /// Prompts for a new value for the selected entry. Invalid numeric
    /// input and cancellation both leave the draft unchanged; nothing is
    /// written to disk until 's'.
    fn edit_selected(&mut self) -> anyhow::Result<()> {
        let field = SettingsField::ALL[self.index];
        let prompt = format!("Enter new value for {}: ", field.label());
        if let Some(input) = read_line(&prompt, &self.draft.value(field))? {
            self.draft.apply(field, input.trim());
        }
        Ok(())
    }
}
