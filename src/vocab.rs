//! Builds [`Menu`]s out of what the window manager reports.

use crate::command::{Action, OutputInfo, WindowInfo, WorkspaceInfo};
use crate::menu::{Entry, Menu};
use crate::traits::WindowManager;

/// One entry per window, titled `"<title> (<app>)"` and tokened by its
/// container id.
pub fn windows_menu<W: WindowManager>(wm: &W, prompt: &str) -> Result<Menu<WindowInfo>, W::Error> {
    let entries = wm
        .get_windows()?
        .into_iter()
        .map(|w| {
            let title = if w.app.is_empty() {
                w.title.clone()
            } else {
                format!("{} ({})", w.title, w.app)
            };
            let token = w.id.to_string();
            Entry::new(title, w).with_token(token)
        })
        .collect();
    Ok(Menu::with_entries(prompt, entries))
}

/// One entry per workspace, in window-manager order.
pub fn workspaces_menu<W: WindowManager>(
    wm: &W,
    prompt: &str,
) -> Result<Menu<WorkspaceInfo>, W::Error> {
    let entries = wm
        .get_workspaces()?
        .into_iter()
        .map(|ws| {
            let token = ws.num.to_string();
            Entry::new(ws.name.clone(), ws).with_token(token)
        })
        .collect();
    Ok(Menu::with_entries(prompt, entries))
}

/// One entry per active output.
pub fn active_outputs_menu<W: WindowManager>(
    wm: &W,
    prompt: &str,
) -> Result<Menu<OutputInfo>, W::Error> {
    let entries = wm
        .get_active_outputs()?
        .into_iter()
        .map(|o| Entry::new(o.name.clone(), o))
        .collect();
    Ok(Menu::with_entries(prompt, entries))
}

/// One entry per active output except the focused workspace's own.
pub fn unfocused_outputs_menu<W: WindowManager>(
    wm: &W,
    prompt: &str,
) -> Result<Menu<OutputInfo>, W::Error> {
    let entries = wm
        .get_unfocused_outputs()?
        .into_iter()
        .map(|o| Entry::new(o.name.clone(), o))
        .collect();
    Ok(Menu::with_entries(prompt, entries))
}

/// The top-level menu listing every [`Action`].
pub fn actions_menu() -> Menu<Action> {
    let entries = Action::ALL
        .into_iter()
        .map(|a| Entry::new(a.description(), a).with_token(a.name()).group())
        .collect();
    Menu::with_entries("Action", entries)
}
