//! Raw-mode terminal access: termios guard, blocking key reads, and the
//! escape-sequence decoding the key loop needs. Unix-only, by way of libc.

use std::io::{self, Write};
use std::os::raw::c_int;

/// One decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    CtrlC,
    Char(char),
}

/// How long to wait after a lone ESC byte for the rest of a CSI sequence
/// before treating it as the Escape key.
const ESC_SEQUENCE_TIMEOUT_MS: i32 = 10;

fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & libc::POLLIN) != 0
}

fn read_available(fd: c_int, buffer: &mut [u8]) -> io::Result<usize> {
    let read_len =
        unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len()) };
    if read_len < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(read_len as usize)
}

/// Puts stdin into raw mode for the lifetime of the guard and restores the
/// original termios on drop, including on panic unwind.
pub struct RawModeGuard {
    original: libc::termios,
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        let original = get_termios(libc::STDIN_FILENO)?;
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(libc::STDIN_FILENO, &raw)?;
        Ok(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = set_termios(libc::STDIN_FILENO, &self.original);
    }
}

/// Clears the visible screen and scrollback and homes the cursor.
pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x1b[2J\x1b[3J\x1b[H")?;
    stdout.flush()
}

/// Current terminal width in columns, defaulting to 80 when the terminal
/// does not report one.
#[must_use]
pub fn terminal_width() -> usize {
    let mut size = unsafe { std::mem::zeroed::<libc::winsize>() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        size.ws_col as usize
    } else {
        80
    }
}

/// Blocks until one key press is decoded.
///
/// Unrecognized byte bursts (stray control bytes, unterminated escape
/// sequences) are dropped and the read continues.
pub fn read_key() -> io::Result<Key> {
    let fd = libc::STDIN_FILENO;
    let mut buffer = [0u8; 64];

    loop {
        let read_len = read_available(fd, &mut buffer)?;
        if read_len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for input",
            ));
        }

        let mut bytes = buffer[..read_len].to_vec();
        // A lone ESC may be the start of a CSI burst whose remainder has
        // not arrived yet; wait briefly before calling it the Escape key.
        if bytes == [0x1b] && poll_readable(fd, ESC_SEQUENCE_TIMEOUT_MS) {
            let read_len = read_available(fd, &mut buffer)?;
            bytes.extend_from_slice(&buffer[..read_len]);
        }

        if let Some(key) = parse_key_bytes(&bytes) {
            return Ok(key);
        }
    }
}

/// Decodes the first key in a raw byte burst, if any.
fn parse_key_bytes(bytes: &[u8]) -> Option<Key> {
    match bytes {
        [] => None,
        [0x1b] => Some(Key::Escape),
        [0x1b, b'[', rest @ ..] => parse_csi(rest),
        [0x1b, ..] => Some(Key::Escape),
        [b'\r', ..] | [b'\n', ..] => Some(Key::Enter),
        [0x7f, ..] | [0x08, ..] => Some(Key::Backspace),
        [0x03, ..] => Some(Key::CtrlC),
        [byte, ..] if *byte < 0x20 => None,
        _ => String::from_utf8_lossy(bytes).chars().next().map(Key::Char),
    }
}

/// Decodes a CSI sequence body (everything after `ESC [`). Parameter bytes
/// are skipped up to the final byte; only the arrow finals are meaningful.
fn parse_csi(body: &[u8]) -> Option<Key> {
    let final_byte = body.iter().find(|byte| (0x40..=0x7e).contains(*byte))?;
    match final_byte {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_key_bytes, Key};

    #[test]
    fn csi_arrows_decode_to_direction_keys() {
        assert_eq!(parse_key_bytes(b"\x1b[A"), Some(Key::Up));
        assert_eq!(parse_key_bytes(b"\x1b[B"), Some(Key::Down));
        assert_eq!(parse_key_bytes(b"\x1b[C"), Some(Key::Right));
        assert_eq!(parse_key_bytes(b"\x1b[D"), Some(Key::Left));
    }

    #[test]
    fn csi_with_parameters_still_resolves_the_final_byte() {
        assert_eq!(parse_key_bytes(b"\x1b[1;5A"), Some(Key::Up));
    }

    #[test]
    fn lone_escape_is_the_escape_key() {
        assert_eq!(parse_key_bytes(b"\x1b"), Some(Key::Escape));
    }

    #[test]
    fn control_bytes_map_to_their_keys() {
        assert_eq!(parse_key_bytes(b"\r"), Some(Key::Enter));
        assert_eq!(parse_key_bytes(b"\n"), Some(Key::Enter));
        assert_eq!(parse_key_bytes(b"\x7f"), Some(Key::Backspace));
        assert_eq!(parse_key_bytes(b"\x08"), Some(Key::Backspace));
        assert_eq!(parse_key_bytes(b"\x03"), Some(Key::CtrlC));
    }

    #[test]
    fn printable_utf8_decodes_to_char_keys() {
        assert_eq!(parse_key_bytes(b"q"), Some(Key::Char('q')));
        assert_eq!(parse_key_bytes("é".as_bytes()), Some(Key::Char('é')));
        assert_eq!(parse_key_bytes("編".as_bytes()), Some(Key::Char('編')));
    }

    #[test]
    fn unknown_sequences_are_dropped() {
        assert_eq!(parse_key_bytes(b"\x1b[200~"), None);
        assert_eq!(parse_key_bytes(b"\x01"), None);
        assert_eq!(parse_key_bytes(b""), None);
    }
}
