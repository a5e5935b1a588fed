//! Planar geometry helpers
//!
//! Points live in the current, zoom-scaled canvas space. Nothing here knows
//! about zoom or units; callers scale points before asking questions.

use serde::{Deserialize, Serialize};

/// Hit-test radius in canvas pixels. A segment is hit when the pointer is
/// strictly closer than this.
pub const HIT_TEST_THRESHOLD_PX: f64 = 10.0;

/// A position on the canvas in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean(*self, *other)
    }

    /// Multiply both coordinates by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

pub fn euclidean(p1: Point, p2: Point) -> f64 {
    (p2.x - p1.x).hypot(p2.y - p1.y)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Shortest distance from `p` to the segment `a..b`
///
/// The projection parameter is clamped to the segment, so points beyond an
/// end measure to that endpoint. A zero-length segment measures to `a`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return euclidean(p, a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let projection = Point::new(a.x + t * dx, a.y + t * dy);
    euclidean(p, projection)
}

/// Constrain `end` to the dominant axis through `start`
pub fn snap_to_axis(start: Point, end: Point) -> Point {
    if (end.x - start.x).abs() > (end.y - start.y).abs() {
        Point::new(end.x, start.y)
    } else {
        Point::new(start.x, end.y)
    }
}

/// Index of the first segment the pointer hits
///
/// Segments are checked in order and the first one within
/// [`HIT_TEST_THRESHOLD_PX`] wins, even if a later one is closer.
pub fn first_hit<I>(pointer: Point, segments: I) -> Option<usize>
where
    I: IntoIterator<Item = (Point, Point)>,
{
    segments
        .into_iter()
        .position(|(a, b)| point_to_segment_distance(pointer, a, b) < HIT_TEST_THRESHOLD_PX)
}
