use super::{LayoutStrategy, ResizeAction};

use crate::core::client::Client;
use crate::core::types::Geometry;

/// The monocle layout: every tiled client is assigned the full
/// work area, stacked on top of each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monocle;

impl LayoutStrategy for Monocle {
    fn name(&self) -> &str {
        "monocle"
    }

    fn layout(&self, work_area: Geometry, tiled: &[&Client]) -> Vec<ResizeAction> {
        tiled
            .iter()
            .map(|c| ResizeAction::new(c.id(), work_area))
            .collect()
    }
}
