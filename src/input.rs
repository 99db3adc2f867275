//! Inline line editor for raw mode: a prompt with an editable prefill,
//! Enter to submit, Escape to cancel.

use std::io::{self, Write};

use crate::term::{read_key, Key};

/// Reads one line of input, starting from `default`.
///
/// Returns `None` when the user presses Escape; the caller restores
/// whatever was on screen before. Arrow keys are ignored, so editing is
/// append/backspace only.
pub fn read_line(prompt: &str, default: &str) -> io::Result<Option<String>> {
    let mut buffer: Vec<char> = default.chars().collect();
    let mut stdout = io::stdout();

    loop {
        let line: String = buffer.iter().collect();
        write!(stdout, "\r\x1b[K{prompt}{line}")?;
        stdout.flush()?;

        match read_key()? {
            Key::Enter => {
                write!(stdout, "\r\n")?;
                stdout.flush()?;
                return Ok(Some(buffer.iter().collect()));
            }
            Key::Escape => {
                write!(stdout, "\r\x1b[K")?;
                stdout.flush()?;
                return Ok(None);
            }
            Key::Backspace => {
                buffer.pop();
            }
            Key::Char(ch) => {
                buffer.push(ch);
            }
            Key::CtrlC => {
                write!(stdout, "\r\x1b[K")?;
                stdout.flush()?;
                return Ok(None);
            }
            Key::Up | Key::Down | Key::Left | Key::Right => {}
        }
    }
}
