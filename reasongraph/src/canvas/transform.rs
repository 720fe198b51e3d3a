//! Screen and world coordinate spaces.
//!
//! Screen space is measured in pixels from the canvas top-left corner. World
//! space is the pan/zoom independent plane node positions are stored in. The
//! two are separate types so a point cannot be used in the wrong space.

use std::ops::{Add, Sub};

pub use reasongraph_common::WorldPoint;

use super::viewport::Viewport;

/// A point in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const ORIGIN: ScreenPoint = ScreenPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another screen point.
    pub fn distance(self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Offset of this point from the screen origin.
    pub fn to_vector(self) -> ScreenVector {
        ScreenVector::new(self.x, self.y)
    }
}

/// A displacement in screen space (pan offsets, wheel deltas).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVector {
    pub x: f64,
    pub y: f64,
}

impl ScreenVector {
    pub const ZERO: ScreenVector = ScreenVector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Sub for ScreenPoint {
    type Output = ScreenVector;

    fn sub(self, rhs: ScreenPoint) -> ScreenVector {
        ScreenVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<ScreenVector> for ScreenPoint {
    type Output = ScreenPoint;

    fn add(self, rhs: ScreenVector) -> ScreenPoint {
        ScreenPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add for ScreenVector {
    type Output = ScreenVector;

    fn add(self, rhs: ScreenVector) -> ScreenVector {
        ScreenVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ScreenVector {
    type Output = ScreenVector;

    fn sub(self, rhs: ScreenVector) -> ScreenVector {
        ScreenVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Rectangle of the given size centred on `center`.
    pub fn centered(center: ScreenPoint, width: f64, height: f64) -> Self {
        Self {
            min: ScreenPoint::new(center.x - width / 2.0, center.y - height / 2.0),
            max: ScreenPoint::new(center.x + width / 2.0, center.y + height / 2.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Map a screen point into world space: `(s - pan) / zoom`.
pub fn to_world(screen: ScreenPoint, viewport: &Viewport) -> WorldPoint {
    let pan = viewport.pan();
    let zoom = viewport.zoom();
    WorldPoint::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Map a world point onto the screen: `w * zoom + pan`.
pub fn to_screen(world: WorldPoint, viewport: &Viewport) -> ScreenPoint {
    let pan = viewport.pan();
    let zoom = viewport.zoom();
    ScreenPoint::new(world.x * zoom + pan.x, world.y * zoom + pan.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_identity_viewport() {
        let viewport = Viewport::default();
        let world = to_world(ScreenPoint::new(12.5, -3.0), &viewport);
        assert_eq!(world, WorldPoint::new(12.5, -3.0));
    }

    #[test]
    fn test_round_trip_with_pan_and_zoom() {
        let viewport = Viewport::new(2.5, ScreenVector::new(-40.0, 75.0));
        let world = WorldPoint::new(123.4, -56.7);

        let screen = to_screen(world, &viewport);
        let back = to_world(screen, &viewport);

        assert_close(back.x, world.x);
        assert_close(back.y, world.y);
        assert_close(screen.x, 123.4 * 2.5 - 40.0);
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = ScreenRect::centered(ScreenPoint::new(100.0, 100.0), 20.0, 10.0);
        assert!(rect.contains(ScreenPoint::new(90.0, 95.0)));
        assert!(rect.contains(ScreenPoint::new(110.0, 105.0)));
        assert!(!rect.contains(ScreenPoint::new(110.1, 100.0)));
        assert_eq!(rect.width(), 20.0);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = ScreenPoint::new(100.0, 100.0);
        let b = ScreenPoint::new(200.0, 100.0);
        assert_eq!(a.distance(b), 100.0);
        assert_eq!(a.midpoint(b), ScreenPoint::new(150.0, 100.0));
        assert_eq!(b - a, ScreenVector::new(100.0, 0.0));
        assert_eq!(a + ScreenVector::new(1.0, 2.0), ScreenPoint::new(101.0, 102.0));
    }
}
