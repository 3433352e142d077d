//! Selection backends.
//!
//! The set of backends is closed: the terminal, dmenu and rofi.  Each lives
//! in its own module and implements [`MenuProvider`]; [`Provider`] ties them
//! together so the [`registry`] can hold any of them.

pub mod picker;
pub mod registry;
pub mod terminal;

use crate::menu::{Choice, Entry, MenuError};
use crate::traits::MenuProvider;
use picker::{DmenuMenuProvider, RofiMenuProvider};
use terminal::TerminalMenuProvider;

/// Any of the supported selection backends.
pub enum Provider {
    Terminal(TerminalMenuProvider),
    Dmenu(DmenuMenuProvider),
    Rofi(RofiMenuProvider),
}

impl Provider {
    /// Short name of the backend kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Provider::Terminal(_) => "terminal",
            Provider::Dmenu(_) => "dmenu",
            Provider::Rofi(_) => "rofi",
        }
    }
}

impl MenuProvider for Provider {
    fn select<T>(&self, entries: &[&Entry<T>], prompt: &str) -> Result<Choice, MenuError> {
        match self {
            Provider::Terminal(p) => p.select(entries, prompt),
            Provider::Dmenu(p) => p.select(entries, prompt),
            Provider::Rofi(p) => p.select(entries, prompt),
        }
    }
}
