//! Core traits that decouple wmpick from any specific selection backend or
//! window manager.
//!
//! Every concrete backend (the terminal, dmenu, rofi, the i3/sway socket, a
//! test harness, …) implements one of these traits.  The
//! [`Context`](crate::context::Context) and the
//! [`Action`](crate::command::Action) catalogue only depend on these
//! abstractions.

use crate::command::{CommandOutcome, OutputInfo, WindowInfo, WorkspaceInfo};
use crate::menu::{Choice, Entry, MenuError};

/// A backend that performs one selection round-trip with the user.
///
/// # Contract
///
/// * With a non-empty `entries` slice, [`select`](MenuProvider::select)
///   returns [`Choice::Entry`] holding a valid index into `entries`, or
///   [`MenuError::SelectionNotValid`] when the raw input maps to nothing.
/// * With an empty slice the provider runs in *free-text mode* and returns
///   [`Choice::Text`] with a single trailing newline stripped.  It never
///   reports `SelectionNotValid` in that mode.
/// * [`MenuError::NoInput`] means the user cancelled or the input stream
///   ended.  Callers must not retry on it.
/// * Exactly one unit of input (a keystroke, a line, or one picker run) is
///   consumed per call.
pub trait MenuProvider {
    /// Present `entries` under `prompt` and wait for the user's answer.
    fn select<T>(&self, entries: &[&Entry<T>], prompt: &str) -> Result<Choice, MenuError>;
}

/// Abstraction over a window manager that can be queried for its state and
/// driven by textual commands.
///
/// An implementation might talk to i3 or sway over their IPC socket, or it
/// might be an in-memory stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Every window (leaf container holding a client) in the layout tree.
    fn get_windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// All workspaces, in the order the window manager reports them.
    fn get_workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error>;

    /// All outputs, including disabled ones.
    fn get_outputs(&self) -> Result<Vec<OutputInfo>, Self::Error>;

    /// The window that currently has focus, if any.
    fn get_focused_window(&self) -> Result<Option<WindowInfo>, Self::Error> {
        Ok(self.get_windows()?.into_iter().find(|w| w.focused))
    }

    /// Outputs that are enabled and showing a workspace.
    fn get_active_outputs(&self) -> Result<Vec<OutputInfo>, Self::Error> {
        Ok(self
            .get_outputs()?
            .into_iter()
            .filter(|o| o.active)
            .collect())
    }

    /// Active outputs other than the one holding the focused workspace.
    fn get_unfocused_outputs(&self) -> Result<Vec<OutputInfo>, Self::Error> {
        let focused = self
            .get_workspaces()?
            .into_iter()
            .find(|ws| ws.focused)
            .map(|ws| ws.output);
        Ok(self
            .get_active_outputs()?
            .into_iter()
            .filter(|o| Some(&o.name) != focused.as_ref())
            .collect())
    }

    /// Run a command string and return one outcome per sub-command.
    fn command(&self, command: &str) -> Result<Vec<CommandOutcome>, Self::Error>;
}
