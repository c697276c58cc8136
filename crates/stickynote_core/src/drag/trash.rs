//! Trash zone collaborator contract.

use crate::model::geometry::Rect;

/// Drop target that deletes move-dragged notes released inside it.
///
/// Bounds are read on demand at drag end, so implementations may track a
/// layout that changes between drags.
pub trait TrashZone {
    /// Current screen-space bounding rectangle.
    fn bounds(&self) -> Rect;
}

/// Trash zone with a fixed rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTrashZone {
    rect: Rect,
}

impl FixedTrashZone {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Repositions the zone, e.g. after the host viewport was resized.
    pub fn set_bounds(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

impl TrashZone for FixedTrashZone {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
