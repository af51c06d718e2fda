use super::core::{StackMode, XAtom, XWindowID};
use crate::core::types::Geometry;

/// Low-level wrapper around actual X server events.
#[derive(Debug, Clone, Copy)]
pub enum XEvent {
    /// Notification that a window's configuration has changed.
    ConfigureNotify(ConfigureEvent),
    /// A window has asked to be reconfigured.
    ConfigureRequest(ConfigureRequestData),
    /// A window is asking to be mapped. The bool is override_redirect;
    /// `None` means its attributes could not be fetched.
    MapRequest(XWindowID, Option<bool>),
    UnmapNotify(XWindowID),
    DestroyNotify(XWindowID),
    EnterNotify(PointerEvent),
    FocusIn(XWindowID),
    PropertyNotify(PropertyEvent),
    Unknown(u8),
}

/// Data associated with a configure notification.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureEvent {
    /// The window associated with the event.
    pub id: XWindowID,
    /// The new geometry of the window.
    pub geom: Geometry,
    /// Is the window the root window.
    pub is_root: bool,
}

/// Data associated with a configure request.
///
/// Each field is `Some` exactly when the corresponding bit was set in
/// the request's value mask, so a request can be forwarded without
/// changing which fields the client asked about.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureRequestData {
    pub id: XWindowID,
    pub parent: XWindowID,
    pub sibling: Option<XWindowID>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub height: Option<i32>,
    pub width: Option<i32>,
    pub border_width: Option<u32>,
    pub stack_mode: Option<StackMode>,
}

impl ConfigureRequestData {
    /// Whether this request asks for a plain raise: stacking mode Above
    /// with no sibling. A sibling of zero (`XCB_NONE`) counts as absent.
    pub fn is_raise(&self) -> bool {
        matches!(self.stack_mode, Some(StackMode::Above(_)))
            && self.sibling.map_or(true, |s| s == 0)
    }
}

/// Data associated with a pointer crossing event.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    /// The window the pointer entered.
    pub id: XWindowID,
    /// Whether the crossing happened during a grab.
    pub grab: bool,
    /// Whether the crossing came from an inferior window.
    pub inferior: bool,
}

/// Data associated with a property change event.
#[derive(Debug, Clone, Copy)]
pub struct PropertyEvent {
    /// The window associated with the event.
    pub id: XWindowID,
    /// The atom of the property that changed.
    pub atom: XAtom,
    /// The time of the event.
    pub time: u32,
    /// Whether the property was deleted.
    pub deleted: bool,
}
