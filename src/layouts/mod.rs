//! Layout policies for tiled clients.
//!
//! A layout never touches the server itself; it produces a list of
//! [`ResizeAction`]s that the manager then applies through its own
//! reconfigure path.

use std::fmt;

use crate::core::client::Client;
use crate::core::types::Geometry;
use crate::x::core::XWindowID;

/// Monocle: every tiled client gets the whole work area.
pub mod monocle;

pub use monocle::Monocle;

/// A geometry assignment produced by a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeAction {
    pub id: XWindowID,
    pub geom: Geometry,
}

impl ResizeAction {
    #[inline]
    pub fn new(id: XWindowID, geom: Geometry) -> Self {
        Self { id, geom }
    }
}

/// A policy that can lay out tiled clients within a work area.
///
/// Used as a trait object by the manager, so it stays swappable at
/// construction time.
pub trait LayoutStrategy {
    /// The name of the layout.
    fn name(&self) -> &str;

    /// Generates the geometry assignments for the given tiled clients,
    /// in z-order.
    fn layout(&self, work_area: Geometry, tiled: &[&Client]) -> Vec<ResizeAction>;
}

impl fmt::Debug for dyn LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LayoutStrategy({})", self.name())
    }
}
