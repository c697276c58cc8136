//! Canvas geometry value types and pure drag math.
//!
//! # Responsibility
//! - Provide plane coordinates, extents and screen rectangles.
//! - Compute note position/size from a pointer sample and drag reference data.
//!
//! # Invariants
//! - `compute_resize_extent` never returns an extent below
//!   `MIN_NOTE_WIDTH` x `MIN_NOTE_HEIGHT`.
//! - Move math is unconstrained: notes may leave the visible canvas.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Smallest width a note may be resized to.
pub const MIN_NOTE_WIDTH: f64 = 100.0;
/// Smallest height a note may be resized to.
pub const MIN_NOTE_HEIGHT: f64 = 80.0;
/// Extent assigned to freshly created notes.
pub const DEFAULT_NOTE_EXTENT: Extent = Extent {
    width: 200.0,
    height: 150.0,
};

/// Real-valued plane coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Width/height pair of a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns this extent raised to the minimum note size on each axis.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_NOTE_WIDTH),
            height: self.height.max(MIN_NOTE_HEIGHT),
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        DEFAULT_NOTE_EXTENT
    }
}

/// Screen-space bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rectangle from its top-left corner and extent.
    pub fn from_origin(origin: Point, extent: Extent) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + extent.width,
            origin.y + extent.height,
        )
    }

    /// Inclusive hit test on all four edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }
}

/// New top-left position for a move drag: `pointer - offset`.
pub fn compute_move_position(pointer: Point, offset: Point) -> Point {
    pointer - offset
}

/// New extent for a resize drag.
///
/// The pointer delta from `drag_origin` is added to `origin_extent`, then
/// floored at the minimum note size. There is no upper bound.
pub fn compute_resize_extent(pointer: Point, drag_origin: Point, origin_extent: Extent) -> Extent {
    let delta = pointer - drag_origin;
    Extent::new(
        origin_extent.width + delta.x,
        origin_extent.height + delta.y,
    )
    .clamped()
}

#[cfg(test)]
mod tests {
    use super::{
        compute_move_position, compute_resize_extent, Extent, Point, Rect, MIN_NOTE_HEIGHT,
        MIN_NOTE_WIDTH,
    };

    #[test]
    fn move_position_subtracts_offset() {
        let position = compute_move_position(Point::new(120.0, 90.0), Point::new(20.0, 15.0));
        assert_eq!(position, Point::new(100.0, 75.0));
    }

    #[test]
    fn move_position_allows_negative_coordinates() {
        let position = compute_move_position(Point::new(5.0, 5.0), Point::new(40.0, 60.0));
        assert_eq!(position, Point::new(-35.0, -55.0));
    }

    #[test]
    fn resize_grows_with_pointer_delta() {
        let extent = compute_resize_extent(
            Point::new(250.0, 180.0),
            Point::new(200.0, 150.0),
            Extent::new(200.0, 150.0),
        );
        assert_eq!(extent, Extent::new(250.0, 180.0));
    }

    #[test]
    fn resize_clamps_large_negative_delta_to_minimum() {
        let extent = compute_resize_extent(
            Point::new(-500.0, -500.0),
            Point::new(0.0, 0.0),
            Extent::new(200.0, 150.0),
        );
        assert_eq!(extent, Extent::new(100.0, 80.0));
    }

    #[test]
    fn resize_never_drops_below_minimum_for_any_sample() {
        let origin = Point::new(10.0, 10.0);
        let start = Extent::new(120.0, 90.0);
        for step in -40..40 {
            let offset = f64::from(step) * 37.5;
            let extent = compute_resize_extent(
                Point::new(origin.x + offset, origin.y - offset),
                origin,
                start,
            );
            assert!(extent.width >= MIN_NOTE_WIDTH);
            assert!(extent.height >= MIN_NOTE_HEIGHT);
        }
    }

    #[test]
    fn rect_contains_is_inclusive_on_edges() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(110.0, 70.0)));
        assert!(rect.contains(Point::new(60.0, 45.0)));
        assert!(!rect.contains(Point::new(9.999, 45.0)));
        assert!(!rect.contains(Point::new(60.0, 70.001)));
    }

    #[test]
    fn rect_from_origin_spans_extent() {
        let rect = Rect::from_origin(Point::new(1160.0, 680.0), Extent::new(120.0, 120.0));
        assert_eq!(rect, Rect::new(1160.0, 680.0, 1280.0, 800.0));
    }
}
