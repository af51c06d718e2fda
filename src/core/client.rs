//! Types used to represent individual managed windows.

use tracing::trace;

use crate::core::screen::Screen;
use crate::core::types::Geometry;
use crate::x::core::{XWindow, XWindowID};
use crate::x::property::WmSizeHints;

/// Size constraints imposed by a client via WM_NORMAL_HINTS.
///
/// Absent hints collapse to zeros, which every consumer treats as
/// "unconstrained".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeConstraints {
    pub base: (i32, i32),
    pub inc: (i32, i32),
    pub min: (i32, i32),
    pub max: (i32, i32),
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl SizeConstraints {
    /// Derives the constraint block from a WM_NORMAL_HINTS property.
    ///
    /// Base size falls back to the minimum size and vice versa, per
    /// long-standing client conventions.
    pub fn from_hints(hints: Option<&WmSizeHints>) -> Self {
        let Some(hints) = hints else {
            return Self::default();
        };

        let base = hints.base_size.or(hints.min_size).unwrap_or((0, 0));
        let min = hints.min_size.or(hints.base_size).unwrap_or((0, 0));
        let max = hints.max_size.unwrap_or((0, 0));
        let inc = hints.resize_inc.unwrap_or((0, 0));

        // aspect ratios are (numerator, denominator) pairs; the min
        // bound is stored inverted so both checks read the same way
        let min_aspect = match hints.min_aspect {
            Some((num, den)) if num > 0 && den > 0 => den as f32 / num as f32,
            _ => 0.0,
        };
        let max_aspect = match hints.max_aspect {
            Some((num, den)) if num > 0 && den > 0 => num as f32 / den as f32,
            _ => 0.0,
        };

        SizeConstraints {
            base,
            inc,
            min,
            max,
            min_aspect,
            max_aspect,
        }
    }

    /// Whether the hints pin a window to a single size.
    pub fn is_fixed(&self) -> bool {
        let ((minw, minh), (maxw, maxh)) = (self.min, self.max);
        maxw > 0 && maxh > 0 && maxw == minw && maxh == minh
    }

    /// Applies the ICCCM constraint arithmetic to a requested size.
    pub fn constrain(&self, mut geom: Geometry) -> Geometry {
        let (basew, baseh) = self.base;
        let (incw, inch) = self.inc;
        let (minw, minh) = self.min;
        let (maxw, maxh) = self.max;

        let (mut w, mut h) = (geom.width, geom.height);

        // when base is just a copy of min, it must be subtracted
        // after the aspect checks rather than before
        let base_is_min = self.base == self.min;
        if !base_is_min {
            w -= basew;
            h -= baseh;
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
            if self.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            w -= basew;
            h -= baseh;
        }

        if incw > 0 {
            w -= w % incw;
        }
        if inch > 0 {
            h -= h % inch;
        }

        w = (w + basew).max(minw);
        h = (h + baseh).max(minh);

        if maxw > 0 {
            w = w.min(maxw);
        }
        if maxh > 0 {
            h = h.min(maxh);
        }

        geom.width = w;
        geom.height = h;
        geom
    }
}

/// A managed window and its bookkeeping state.
///
/// Since this type is not Copy, it should not be passed around;
/// it is owned by the client registry and referenced by its
/// window ID everywhere else.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) xwindow: XWindow,
    border_width: u32,
    old_border_width: u32,
    constraints: SizeConstraints,
    floating: bool,
    urgent: bool,
    transient_for: Option<XWindowID>,
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.xwindow.id == other.xwindow.id
    }
}

impl Client {
    /// Creates a new Client from its initial server-side geometry
    /// and border width.
    pub fn new(id: XWindowID, geom: Geometry, border_width: u32) -> Self {
        Self {
            xwindow: XWindow::with_data(id, geom),
            border_width,
            old_border_width: border_width,
            constraints: SizeConstraints::default(),
            floating: false,
            urgent: false,
            transient_for: None,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> XWindowID {
        self.xwindow.id
    }

    #[inline(always)]
    pub fn geometry(&self) -> Geometry {
        self.xwindow.geom
    }

    pub fn set_geometry(&mut self, geom: Geometry) {
        self.xwindow.set_geometry(geom);
    }

    #[inline(always)]
    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    pub fn set_border_width(&mut self, bw: u32) {
        self.border_width = bw;
    }

    /// The border width the window had before we started managing it,
    /// restored when it is released.
    #[inline(always)]
    pub fn old_border_width(&self) -> u32 {
        self.old_border_width
    }

    #[inline(always)]
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn set_floating(&mut self, floating: bool) {
        self.floating = floating;
    }

    #[inline(always)]
    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    pub fn set_urgent(&mut self, urgent: bool) {
        self.urgent = urgent;
    }

    #[inline(always)]
    pub fn is_fixed(&self) -> bool {
        self.constraints.is_fixed()
    }

    #[inline(always)]
    pub fn transient_for(&self) -> Option<XWindowID> {
        self.transient_for
    }

    pub fn set_transient_for(&mut self, target: Option<XWindowID>) {
        self.transient_for = target;
    }

    #[inline(always)]
    pub fn constraints(&self) -> &SizeConstraints {
        &self.constraints
    }

    /// Replaces the constraint block; fixed-size windows are
    /// forced floating.
    pub fn update_constraints(&mut self, hints: Option<&WmSizeHints>) {
        self.constraints = SizeConstraints::from_hints(hints);
        if self.constraints.is_fixed() {
            self.floating = true;
        }
    }

    /// Adjusts a proposed geometry for this client against the screen
    /// bounds and, for floating clients, its size constraints.
    ///
    /// Returns the adjusted geometry and whether it differs from the
    /// client's current one.
    pub fn apply_size_hints(&self, screen: &Screen, proposed: Geometry) -> (Geometry, bool) {
        let scr = screen.effective_geom();
        let mut geom = proposed;

        // windows are at least 1x1
        geom.width = geom.width.max(1);
        geom.height = geom.height.max(1);

        if geom.x > scr.right() {
            geom.x = scr.width - geom.width;
        }
        if geom.y > scr.bottom() {
            geom.y = scr.height - geom.height;
        }
        if geom.x + geom.width < scr.x {
            geom.x = scr.x;
        }
        if geom.y + geom.height < scr.y {
            geom.y = scr.y;
        }

        if self.floating {
            geom = self.constraints.constrain(geom);
        }

        trace!(
            "size hints for {}: {:?} -> {:?}",
            self.id(),
            proposed,
            geom
        );

        (geom, geom != self.geometry())
    }
}
