//! Basic types used throughout the crate.

use thiserror::Error;

use crate::x::core::{XError, XWindowID};

pub type Result<T> = ::core::result::Result<T, WmError>;

/// Top-level error type for window manager operations.
#[derive(Debug, Error)]
pub enum WmError {
    /// An error bubbled up from the X connection.
    #[error(transparent)]
    XError(#[from] XError),

    /// Another window manager already owns substructure redirection
    /// on the root window.
    #[error("another window manager is already running")]
    OtherWm,

    /// An operation referenced a window we are not managing.
    #[error("unknown client: {0}")]
    UnknownClient(XWindowID),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The on-screen geometry of a window: position of the top-left
/// corner plus height and width of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub height: i32,
    pub width: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            x: 0,
            y: 0,
            height: 100,
            width: 160,
        }
    }
}

impl Geometry {
    pub fn new(x: i32, y: i32, h: i32, w: i32) -> Self {
        Geometry {
            x,
            y,
            height: h,
            width: w,
        }
    }

    pub fn zeroed() -> Self {
        Geometry {
            x: 0,
            y: 0,
            height: 0,
            width: 0,
        }
    }

    /// The x coordinate one past the right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// The y coordinate one past the bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether this geometry has the same size as another,
    /// ignoring position.
    #[inline]
    pub fn same_size(&self, other: &Geometry) -> bool {
        self.height == other.height && self.width == other.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_edges() {
        let geom = Geometry::new(10, 20, 300, 400);

        assert_eq!(geom.right(), 410);
        assert_eq!(geom.bottom(), 320);
        assert!(geom.same_size(&Geometry::new(0, 0, 300, 400)));
        assert!(!geom.same_size(&Geometry::new(10, 20, 300, 401)));
    }
}
