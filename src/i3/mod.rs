//! i3 / sway implementations.
//!
//! This module provides the concrete backend for the
//! [`WindowManager`](crate::traits::WindowManager) trait, powered by the
//! IPC socket both window managers share.
//!
//! Nothing outside this module should reference the IPC protocol directly.

pub mod wm;
