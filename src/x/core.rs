//! The core interface to the X server.
//!
//! This module defines `XConn`, the trait that the rest of the crate
//! uses to talk to the server, as well as the error type returned by
//! all connection operations.

use thiserror::Error;

use crate::core::types::Geometry;
use crate::x::atom::Atom;
use crate::x::event::{ConfigureRequestData, XEvent};
use crate::x::property::{Property, WindowState, WmHints, WmSizeHints};

/// An X server ID for a window.
pub type XWindowID = u32;
/// An X server ID for an interned atom.
pub type XAtom = u32;

/// A window as the X server sees it: its ID and last known geometry.
#[derive(Debug, Clone, Copy)]
pub struct XWindow {
    pub id: XWindowID,
    pub geom: Geometry,
}

impl PartialEq for XWindow {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl From<XWindowID> for XWindow {
    fn from(from: XWindowID) -> Self {
        Self {
            id: from,
            geom: Geometry::zeroed(),
        }
    }
}

impl XWindow {
    pub fn with_data(id: XWindowID, geom: Geometry) -> Self {
        Self { id, geom }
    }

    /// Sets the geometry using a provided Geometry.
    pub fn set_geometry(&mut self, geom: Geometry) {
        self.geom = geom;
    }
}

/// Geometry of a window together with its current border width,
/// as returned by a single geometry query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub geom: Geometry,
    pub border_width: u32,
}

/// The results of a batched query about a top-level window, used
/// when adopting pre-existing windows at startup.
#[derive(Debug, Clone, Copy)]
pub struct WindowSnapshot {
    pub id: XWindowID,
    pub override_redirect: bool,
    pub viewable: bool,
    /// Whether WM_HINTS declares an Iconic initial state.
    pub initial_iconic: bool,
    pub transient_for: Option<XWindowID>,
}

/// Window stacking modes, with the optional sibling the restack
/// is relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackMode {
    Above(Option<XWindowID>),
    Below(Option<XWindowID>),
    TopIf(Option<XWindowID>),
    BottomIf(Option<XWindowID>),
    Opposite(Option<XWindowID>),
}

/// Configuration requests to be made on a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientConfig {
    BorderWidth(u32),
    Position { x: i32, y: i32 },
    Resize { h: i32, w: i32 },
    StackingMode(StackMode),
}

/// Attribute changes to be made on a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientAttrs {
    /// The event mask set on every managed client.
    EnableClientEvents,
    /// Substructure redirection only; claiming this is how a window
    /// manager announces itself, and only one client may hold it.
    RootRedirect,
    /// The full event mask selected on the root once we own it.
    RootEventMask,
}

/// Errors returned by X connection operations.
#[derive(Debug, Error, Clone)]
pub enum XError {
    /// An error when establishing a connection with the server.
    #[error("X connection error: {0}")]
    Connection(String),

    /// An error caused by a malformed protocol request.
    #[error("X protocol error: {0}")]
    Protocol(String),

    /// The server did not report any screens.
    #[error("Could not find screens from the X server")]
    NoScreens,

    /// The target window of a request no longer exists.
    ///
    /// Windows can die at any time between us hearing about them and
    /// us acting on them, so most callers treat this as a benign race
    /// rather than a failure.
    #[error("window {0} no longer exists")]
    WindowGone(XWindowID),

    /// Invalid data received when converting a server reply.
    #[error("Invalid data: {0}")]
    ConversionError(String),

    /// A property query returned data we could not interpret.
    #[error("Invalid property data: {0}")]
    InvalidPropertyData(String),

    /// The server returned an error for a request.
    #[error("X request error: {0}")]
    RequestError(&'static str),

    /// Everything else.
    #[error("X server error: {0}")]
    ServerError(String),
}

impl XError {
    /// Whether this error means the target window went away under us.
    #[inline]
    pub fn is_window_gone(&self) -> bool {
        matches!(self, XError::WindowGone(_))
    }
}

pub type Result<T> = ::core::result::Result<T, XError>;

/// A trait used to define the interface between the window manager
/// and the X server.
///
/// One live implementation exists (x11rb); tests substitute a dummy.
pub trait XConn {
    // General server operations

    /// Blocks until the next event arrives.
    ///
    /// `Ok(None)` means the connection shut down cleanly.
    fn poll_next_event(&self) -> Result<Option<XEvent>>;
    fn get_root(&self) -> XWindow;
    fn get_geometry(&self, window: XWindowID) -> Result<WindowGeometry>;
    fn query_tree(&self, window: XWindowID) -> Result<Vec<XWindowID>>;
    /// Batches attribute, transient and hint queries for all given
    /// windows before collecting a single reply, so startup adoption
    /// costs two round trips instead of two per window.
    fn window_snapshots(&self, windows: &[XWindowID]) -> Result<Vec<WindowSnapshot>>;
    fn atom(&self, atom: &str) -> Result<XAtom>;
    fn lookup_interned_atom(&self, atom: XAtom) -> Option<String>;
    fn grab_server(&self) -> Result<()>;
    fn ungrab_server(&self) -> Result<()>;

    // Window-related operations

    fn map_window(&self, window: XWindowID) -> Result<()>;
    fn configure_window(&self, window: XWindowID, attrs: &[ClientConfig]) -> Result<()>;
    /// Forwards a configure request from an unmanaged window verbatim,
    /// as a single request carrying exactly the originally set fields.
    fn forward_configure_request(&self, data: &ConfigureRequestData) -> Result<()>;
    fn change_window_attributes(&self, window: XWindowID, attrs: &[ClientAttrs]) -> Result<()>;
    fn set_input_focus(&self, window: XWindowID) -> Result<()>;
    /// Sends a synthetic ConfigureNotify describing `geom` to the window.
    fn send_configure_notify(&self, window: XWindowID, geom: Geometry) -> Result<()>;

    // Property operations

    fn get_property(&self, prop: &str, window: XWindowID) -> Result<Option<Property>>;
    fn set_property(&self, window: XWindowID, prop: &str, data: Property) -> Result<()>;

    // ICCCM/EWMH helpers over the property operations

    fn get_wm_size_hints(&self, window: XWindowID) -> Option<WmSizeHints> {
        if let Ok(Some(Property::WMSizeHints(sh))) =
            self.get_property(Atom::WmNormalHints.as_ref(), window)
        {
            Some(sh)
        } else {
            None
        }
    }

    fn get_wm_hints(&self, window: XWindowID) -> Option<WmHints> {
        if let Ok(Some(Property::WMHints(hints))) =
            self.get_property(Atom::WmHints.as_ref(), window)
        {
            Some(hints)
        } else {
            None
        }
    }

    fn get_wm_transient_for(&self, window: XWindowID) -> Option<XWindowID> {
        match self.get_property(Atom::WmTransientFor.as_ref(), window) {
            Ok(Some(Property::Window(ids))) => {
                let id = *ids.first()?;
                if id == 0 {
                    None
                } else {
                    Some(id)
                }
            }
            _ => None,
        }
    }

    fn set_wm_state(&self, window: XWindowID, state: WindowState) -> Result<()> {
        self.set_property(
            window,
            Atom::WmState.as_ref(),
            Property::U32List(Atom::WmState.as_ref().into(), vec![state as u32, 0]),
        )
    }

    fn set_wm_hints(&self, window: XWindowID, hints: WmHints) -> Result<()> {
        self.set_property(window, Atom::WmHints.as_ref(), Property::WMHints(hints))
    }

    fn set_supported(&self, atoms: &[Atom]) -> Result<()> {
        self.set_property(
            self.get_root().id,
            Atom::NetSupported.as_ref(),
            Property::Atom(atoms.iter().map(|a| a.as_ref().into()).collect()),
        )
    }
}
