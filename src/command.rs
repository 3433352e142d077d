//! Window-manager actions and the data types they operate on.
//!
//! This module defines the vocabulary the launcher shares with the
//! connector: [`WindowInfo`] / [`WorkspaceInfo`] / [`OutputInfo`] describe
//! what the window manager reports, and [`Action`] is the catalogue of
//! things the user can do.  Each action gathers its arguments through the
//! [`Context`] and produces exactly one command string.

use crate::context::Context;
use crate::menu::{Entry, Menu, MenuError};
use crate::traits::WindowManager;
use crate::vocab;
use log::debug;
use std::fmt;

/// A client window known to the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Container id (`con_id` in criteria).
    pub id: i64,
    /// X11 window id, absent for native Wayland clients.
    pub window: Option<i64>,
    /// Human-readable title.
    pub title: String,
    /// X11 class or Wayland app id.
    pub app: String,
    /// Name of the workspace holding the window.
    pub workspace: String,
    pub focused: bool,
}

/// A workspace as reported by `GET_WORKSPACES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub num: i32,
    pub name: String,
    /// Name of the output the workspace lives on (e.g. `"DP-1"`).
    pub output: String,
    pub focused: bool,
    pub visible: bool,
}

/// An output as reported by `GET_OUTPUTS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    pub active: bool,
    pub current_workspace: Option<String>,
}

/// Result of one sub-command of a `RUN_COMMAND` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// Border styles offered by [`Action::Border`].
pub const BORDER_STYLES: [&str; 5] = ["none", "normal", "pixel 1", "pixel 3", "toggle"];

/// Every action the launcher can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Change the border style of a window.
    Border,
    /// Switch to a workspace.
    GotoWorkspace,
    /// Move a window to a workspace.
    MoveWindowToWorkspace,
    /// Rename the focused workspace.
    RenameWorkspace,
    /// Move the focused workspace to another output.
    MoveWorkspaceToOutput,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Border,
        Action::GotoWorkspace,
        Action::MoveWindowToWorkspace,
        Action::RenameWorkspace,
        Action::MoveWorkspaceToOutput,
    ];

    /// Stable identifier used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Border => "border",
            Action::GotoWorkspace => "goto_workspace",
            Action::MoveWindowToWorkspace => "move_window_to_workspace",
            Action::RenameWorkspace => "rename_workspace",
            Action::MoveWorkspaceToOutput => "move_workspace_to_output",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::Border => "change the border style",
            Action::GotoWorkspace => "go to workspace",
            Action::MoveWindowToWorkspace => "move window to workspace",
            Action::RenameWorkspace => "rename the focused workspace",
            Action::MoveWorkspaceToOutput => "move the focused workspace to an output",
        }
    }

    /// Look an action up by [`name`](Action::name) (case-insensitive,
    /// `-` and `_` are interchangeable).
    pub fn from_name(name: &str) -> Option<Action> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Action::ALL.into_iter().find(|a| a.name() == normalized)
    }

    /// Ask the user for whatever this action needs and build the command
    /// string.
    ///
    /// Returns `Ok(None)` when the user gave an empty answer somewhere along
    /// the way; there is nothing to send in that case.
    pub fn command<W: WindowManager>(
        &self,
        ctx: &Context<'_>,
        wm: &W,
    ) -> Result<Option<String>, ActionError> {
        let cmd = match self {
            Action::Border => {
                let Some(target) = target_window(ctx, wm)? else {
                    return Ok(None);
                };
                let styles = Menu::with_entries(
                    "Border style",
                    BORDER_STYLES
                        .iter()
                        .map(|s| Entry::new(*s, *s))
                        .collect(),
                );
                ctx.selectinput(&styles, None, None)?
                    .map(|style| format!("[con_id={}] border {}", target.id, style))
            }
            Action::GotoWorkspace => {
                let menu = vocab::workspaces_menu(wm, "Go to workspace").map_err(wm_error)?;
                ctx.selectinput(&menu, None, None)?
                    .map(|ws| format!("workspace {}", quote(&ws.name)))
            }
            Action::MoveWindowToWorkspace => {
                let Some(target) = target_window(ctx, wm)? else {
                    return Ok(None);
                };
                let menu =
                    vocab::workspaces_menu(wm, "Move window to workspace").map_err(wm_error)?;
                ctx.selectinput(&menu, None, None)?.map(|ws| {
                    format!(
                        "[con_id={}] move container to workspace {}",
                        target.id,
                        quote(&ws.name)
                    )
                })
            }
            Action::RenameWorkspace => ctx
                .textinput(Some("New workspace name"))?
                .map(|name| format!("rename workspace to {}", quote(&name))),
            Action::MoveWorkspaceToOutput => {
                let menu = vocab::unfocused_outputs_menu(wm, "Move workspace to output")
                    .map_err(wm_error)?;
                ctx.selectinput(&menu, None, None)?
                    .map(|o| format!("move workspace to output {}", quote(&o.name)))
            }
        };
        debug!("{} -> {:?}", self.name(), cmd);
        Ok(cmd)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building an action's command.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Menu(#[from] MenuError),
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

fn wm_error<E: std::error::Error>(e: E) -> ActionError {
    ActionError::WindowManager(e.to_string())
}

/// The window an action applies to: the focused one, or one picked from the
/// window list when nothing has focus.
fn target_window<W: WindowManager>(
    ctx: &Context<'_>,
    wm: &W,
) -> Result<Option<WindowInfo>, ActionError> {
    if let Some(focused) = wm.get_focused_window().map_err(wm_error)? {
        return Ok(Some(focused));
    }
    let menu = vocab::windows_menu(wm, "Window").map_err(wm_error)?;
    Ok(ctx.selectinput(&menu, None, None)?.cloned())
}

/// Quote a value for use as a command argument.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
