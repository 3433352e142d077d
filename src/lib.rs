//! **wmpick**: a menu-driven launcher for i3 and sway commands.
//!
//! The user picks an action (change a border, jump to a workspace, move a
//! window, …) and its arguments from a menu; the choice becomes one command
//! string sent to the window manager's IPC socket.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::MenuProvider`]: one selection round-trip with the user, so
//!   the menus are not coupled to any specific frontend.  The terminal,
//!   dmenu and rofi backends live in [`provider`] and are ranked by the
//!   [`provider::registry::ProviderRegistry`].
//! * [`traits::WindowManager`]: abstracts state queries and command
//!   execution so the action catalogue is not coupled to any specific
//!   compositor.  The i3 / sway backend lives in [`i3`].
//!
//! [`context::Context`] ties them together: it owns the choice of active
//! provider and retries invalid selections until the user either picks
//! something or cancels.

pub mod command;
pub mod config;
pub mod context;
pub mod i3;
pub mod menu;
pub mod provider;
pub mod traits;
pub mod vocab;
