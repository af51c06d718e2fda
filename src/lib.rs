//! monowm is a minimal tiling window manager for X11.
//!
//! It manages all top-level windows with a single monocle layout:
//! every tiled window is given the entire screen, and windows are
//! distinguished by stacking order instead of position. Windows that
//! declare a fixed size or a transient-for relation float above the
//! layout.
//!
//! There are no workspaces, no bars, no keybindings and no
//! configuration; this crate is deliberately small. The pieces are
//! exposed as a library so the layout policy and the backing
//! connection can be swapped out.

pub mod core;
pub mod layouts;
pub mod manager;
pub mod x;

pub use crate::core::types;
pub use crate::core::types::{Result, WmError};
pub use crate::manager::WindowManager;
pub use crate::x::core::Result as XResult;

use crate::x::status::Initialized;
use crate::x::x11rb::X11RBConn;

/// Convenience function for creating an x11rb-backed WindowManager.
pub fn x11rb_backed_wm() -> XResult<WindowManager<X11RBConn<Initialized>>> {
    let conn = X11RBConn::new()?;

    Ok(WindowManager::new(conn))
}
