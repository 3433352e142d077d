//! [`MenuProvider`] that renders a numbered list in the terminal.
//!
//! With entries on offer a single raw keystroke picks one; without entries a
//! whole line is read as free text.  All terminal access goes through
//! [`TerminalIo`] so the selection logic can be driven by a script in tests.

use crate::menu::{strip_line_terminator, Choice, Entry, MenuError};
use crate::traits::MenuProvider;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{style, Stylize};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::debug;
use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Read, Write};

/// End of text (Ctrl-C).
pub const ETX: char = '\x03';
/// End of transmission (Ctrl-D).
pub const EOT: char = '\x04';
/// Escape.
pub const ESC: char = '\x1b';

/// Keystrokes that cancel a selection instead of choosing an entry.
pub const CANCEL_KEYS: [char; 3] = [ETX, EOT, ESC];

/// Raw terminal access used by [`TerminalMenuProvider`].
pub trait TerminalIo {
    /// Write `text` to the display and flush it.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Block until one key is pressed and return it as a character.
    ///
    /// Ctrl-C, Ctrl-D and Escape are reported as [`ETX`], [`EOT`] and
    /// [`ESC`] respectively.
    fn read_key(&mut self) -> io::Result<char>;

    /// Read one line.  `None` means the user interrupted or input ended.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The process's own stdin/stdout.
///
/// On a TTY, keys are read in raw mode through crossterm.  When stdin is a
/// pipe, bytes and lines are read from it directly.
#[derive(Debug, Default)]
pub struct StdTerminal;

/// Leaves raw mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Map a key event to the character the provider reasons about.
fn key_char(key: &KeyEvent) -> Option<char> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(ETX),
        KeyCode::Char('d') if ctrl => Some(EOT),
        KeyCode::Esc => Some(ESC),
        KeyCode::Enter => Some('\r'),
        KeyCode::Char(c) if !ctrl => Some(c),
        _ => None,
    }
}

/// Next key press, ignoring releases, repeats and non-key events.
fn next_key_press() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

impl TerminalIo for StdTerminal {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_key(&mut self) -> io::Result<char> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            let mut byte = [0u8; 1];
            return match stdin.lock().read(&mut byte)? {
                0 => Ok(EOT),
                _ => Ok(char::from(byte[0])),
            };
        }

        let _raw = RawModeGuard::enable()?;
        loop {
            if let Some(c) = key_char(&next_key_press()?) {
                return Ok(c);
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            let mut line = String::new();
            return match stdin.lock().read_line(&mut line)? {
                0 => Ok(None),
                _ => Ok(Some(line)),
            };
        }

        // Minimal line editor so Ctrl-C ends the prompt instead of the process.
        let _raw = RawModeGuard::enable()?;
        let mut line = String::new();
        loop {
            let key = next_key_press()?;
            if key.code == KeyCode::Backspace {
                if line.pop().is_some() {
                    self.write("\u{8} \u{8}")?;
                }
                continue;
            }
            match key_char(&key) {
                Some(ETX) | Some(ESC) => {
                    self.write("\r\n")?;
                    return Ok(None);
                }
                Some(EOT) if line.is_empty() => {
                    self.write("\r\n")?;
                    return Ok(None);
                }
                Some('\r') => {
                    self.write("\r\n")?;
                    return Ok(Some(line));
                }
                Some(c) if !c.is_control() => {
                    line.push(c);
                    self.write(c.encode_utf8(&mut [0u8; 4]))?;
                }
                _ => {}
            }
        }
    }
}

/// Labels `"1"` through `"n"`, in entry order.
fn index_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| i.to_string()).collect()
}

/// Render the prompt, the numbered entries and, when there are entries, the
/// valid-range hint.
pub fn render_menu<T>(title: &str, entries: &[&Entry<T>], prompt: &str) -> String {
    let mut out = format!("{} {}: \n", style(format!("({})", title)).bold().blue(), prompt);
    let labels = index_labels(entries.len());
    let lines: Vec<String> = labels
        .iter()
        .zip(entries)
        .map(|(idx, e)| format!("{}: {}", style(idx).green(), e.label()))
        .collect();
    out.push_str(&lines.join("\n"));
    if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
        out.push('\n');
        out.push_str(&format!("[{}-{}] ", first, last));
    }
    out
}

/// Numbered-list provider for interactive terminals.
pub struct TerminalMenuProvider {
    title: String,
    io: RefCell<Box<dyn TerminalIo>>,
}

impl TerminalMenuProvider {
    /// A provider on the process's own terminal.
    ///
    /// `title` is shown in front of every prompt.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_io(title, Box::new(StdTerminal))
    }

    /// A provider reading and writing through `io`.
    pub fn with_io(title: impl Into<String>, io: Box<dyn TerminalIo>) -> Self {
        Self {
            title: title.into(),
            io: RefCell::new(io),
        }
    }
}

impl MenuProvider for TerminalMenuProvider {
    fn select<T>(&self, entries: &[&Entry<T>], prompt: &str) -> Result<Choice, MenuError> {
        let mut io = self.io.borrow_mut();
        io.write(&render_menu(&self.title, entries, prompt))?;

        if entries.is_empty() {
            return match io.read_line()? {
                Some(line) => Ok(Choice::Text(strip_line_terminator(&line).to_string())),
                None => Err(MenuError::NoInput),
            };
        }

        let key = io.read_key()?;
        io.write("\n")?;
        if CANCEL_KEYS.contains(&key) {
            debug!("cancelled with {:?}", key);
            return Err(MenuError::NoInput);
        }
        let key = key.to_string();
        index_labels(entries.len())
            .iter()
            .position(|label| *label == key)
            .map(Choice::Entry)
            .ok_or(MenuError::SelectionNotValid(key))
    }
}
