//! Types used for representing the output we are managing.

use tracing::debug;

use crate::core::types::Geometry;
use crate::x::core::{XWindow, XWindowID};

/// The screen the window manager is running on.
///
/// `true_geom` is what the server reports; `effective_geom` is the
/// work area handed to the layout. They are currently equal, but the
/// distinction is kept so reserved regions can be carved out later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub(crate) root: XWindow,
    true_geom: Geometry,
    effective_geom: Geometry,
}

impl Screen {
    pub fn new(root: XWindow) -> Self {
        Self {
            root,
            true_geom: root.geom,
            effective_geom: root.geom,
        }
    }

    #[inline(always)]
    pub fn root_id(&self) -> XWindowID {
        self.root.id
    }

    #[inline(always)]
    pub fn true_geom(&self) -> Geometry {
        self.true_geom
    }

    #[inline(always)]
    pub fn effective_geom(&self) -> Geometry {
        self.effective_geom
    }

    /// Records a new screen size, keeping the position.
    ///
    /// Returns whether the size actually changed.
    pub fn update_size(&mut self, height: i32, width: i32) -> bool {
        if self.true_geom.height == height && self.true_geom.width == width {
            return false;
        }
        debug!("screen resized to {}x{}", width, height);

        self.true_geom.height = height;
        self.true_geom.width = width;
        self.effective_geom.height = height;
        self.effective_geom.width = width;
        self.root.geom = self.true_geom;
        true
    }
}
