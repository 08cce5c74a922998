//! Canonical boundary points of a shape's axis-aligned extent.

use crate::error::{SnapError, SnapResult};
use crate::shapes::{CoordinateSpace, SnapShape};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Largest supported number of decimal digits kept by a [`Quantizer`].
pub const MAX_PRECISION: u32 = 8;

/// Rounds coordinates to a fixed number of decimal digits.
///
/// Indexed points and live points must go through the same quantizer, or
/// lines that should coincide differ by floating noise and never match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    precision: u32,
    scale: f64,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            precision: 2,
            scale: 100.0,
        }
    }
}

impl Quantizer {
    /// Create a quantizer keeping `precision` decimal digits (0 = integers).
    pub fn new(precision: u32) -> SnapResult<Self> {
        if precision > MAX_PRECISION {
            return Err(SnapError::InvalidPrecision(precision));
        }
        Ok(Self {
            precision,
            scale: 10f64.powi(precision as i32),
        })
    }

    /// Number of decimal digits kept.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Round a value to the quantization grid.
    pub fn round(&self, value: f64) -> f64 {
        (value * self.scale).round() / self.scale
    }

    /// Integer grouping key for a value; equal keys mean equal rounded values.
    pub fn key(&self, value: f64) -> i64 {
        (value * self.scale).round() as i64
    }

    /// Round both coordinates of a point.
    pub fn point(&self, point: Point) -> Point {
        Point::new(self.round(point.x), self.round(point.y))
    }
}

/// One of the 8 canonical positions on a shape's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryTag {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    MidLeft,
    MidRight,
    MidTop,
    MidBottom,
}

impl BoundaryTag {
    /// All tags in evaluation order: corners first, then edge midpoints.
    pub const ALL: [BoundaryTag; 8] = [
        BoundaryTag::TopLeft,
        BoundaryTag::TopRight,
        BoundaryTag::BottomLeft,
        BoundaryTag::BottomRight,
        BoundaryTag::MidLeft,
        BoundaryTag::MidRight,
        BoundaryTag::MidTop,
        BoundaryTag::MidBottom,
    ];

    /// Check if this is an edge midpoint.
    pub fn is_midpoint(self) -> bool {
        matches!(
            self,
            BoundaryTag::MidLeft | BoundaryTag::MidRight | BoundaryTag::MidTop | BoundaryTag::MidBottom
        )
    }

    fn index(self) -> usize {
        match self {
            BoundaryTag::TopLeft => 0,
            BoundaryTag::TopRight => 1,
            BoundaryTag::BottomLeft => 2,
            BoundaryTag::BottomRight => 3,
            BoundaryTag::MidLeft => 4,
            BoundaryTag::MidRight => 5,
            BoundaryTag::MidTop => 6,
            BoundaryTag::MidBottom => 7,
        }
    }
}

/// The 8 boundary points of one shape, keyed by tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPointSet {
    points: [Point; 8],
}

impl BoundaryPointSet {
    /// Compute the boundary points of an axis-aligned rectangle.
    ///
    /// Corners are rounded first; midpoints are the rounded means of the
    /// rounded corners, so `mid-top` sits between `top-left` and `top-right`.
    pub fn from_rect(rect: Rect, quantizer: &Quantizer) -> Self {
        let left = quantizer.round(rect.x0.min(rect.x1));
        let right = quantizer.round(rect.x0.max(rect.x1));
        let top = quantizer.round(rect.y0.min(rect.y1));
        let bottom = quantizer.round(rect.y0.max(rect.y1));
        let center_x = quantizer.round((left + right) / 2.0);
        let center_y = quantizer.round((top + bottom) / 2.0);

        Self {
            points: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(left, bottom),
                Point::new(right, bottom),
                Point::new(left, center_y),
                Point::new(right, center_y),
                Point::new(center_x, top),
                Point::new(center_x, bottom),
            ],
        }
    }

    /// Compute the boundary points of a shape in the given space.
    pub fn of_shape(shape: &dyn SnapShape, space: CoordinateSpace, quantizer: &Quantizer) -> Self {
        Self::from_rect(shape.bounds(space), quantizer)
    }

    /// Get the point for a tag.
    pub fn get(&self, tag: BoundaryTag) -> Point {
        self.points[tag.index()]
    }

    /// Iterate over `(tag, point)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (BoundaryTag, Point)> + '_ {
        BoundaryTag::ALL.iter().map(move |&tag| (tag, self.get(tag)))
    }

    /// The rectangle spanned by the corners.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.get(BoundaryTag::TopLeft), self.get(BoundaryTag::BottomRight))
    }

    /// Shift every point by `(dx, dy)` and re-round.
    pub fn translated(&self, dx: f64, dy: f64, quantizer: &Quantizer) -> Self {
        let mut points = self.points;
        for point in &mut points {
            *point = quantizer.point(Point::new(point.x + dx, point.y + dy));
        }
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantizer_rounding() {
        let q = Quantizer::new(2).unwrap();
        assert!((q.round(1.23456) - 1.23).abs() < f64::EPSILON);
        assert!((q.round(0.1 + 0.2) - 0.3).abs() < f64::EPSILON);
        assert_eq!(q.key(0.1 + 0.2), q.key(0.3));

        let q = Quantizer::new(0).unwrap();
        assert!((q.round(10.6) - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quantizer_rejects_excess_precision() {
        assert!(matches!(Quantizer::new(9), Err(SnapError::InvalidPrecision(9))));
    }

    #[test]
    fn test_boundary_points() {
        let q = Quantizer::default();
        let set = BoundaryPointSet::from_rect(Rect::new(10.0, 20.0, 110.0, 70.0), &q);
        assert_eq!(set.get(BoundaryTag::TopLeft), Point::new(10.0, 20.0));
        assert_eq!(set.get(BoundaryTag::TopRight), Point::new(110.0, 20.0));
        assert_eq!(set.get(BoundaryTag::BottomLeft), Point::new(10.0, 70.0));
        assert_eq!(set.get(BoundaryTag::BottomRight), Point::new(110.0, 70.0));
        assert_eq!(set.get(BoundaryTag::MidLeft), Point::new(10.0, 45.0));
        assert_eq!(set.get(BoundaryTag::MidRight), Point::new(110.0, 45.0));
        assert_eq!(set.get(BoundaryTag::MidTop), Point::new(60.0, 20.0));
        assert_eq!(set.get(BoundaryTag::MidBottom), Point::new(60.0, 70.0));
    }

    #[test]
    fn test_midpoints_consistent_with_corners() {
        let q = Quantizer::default();
        let set = BoundaryPointSet::from_rect(Rect::new(0.004, 0.0, 33.336, 17.5), &q);
        let tl = set.get(BoundaryTag::TopLeft);
        let tr = set.get(BoundaryTag::TopRight);
        let mid = set.get(BoundaryTag::MidTop);
        assert!((q.round((tl.x + tr.x) / 2.0) - mid.x).abs() < f64::EPSILON);
        assert!((mid.y - tl.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_rect_is_normalized() {
        let q = Quantizer::default();
        let set = BoundaryPointSet::from_rect(Rect::new(100.0, 50.0, 0.0, 0.0), &q);
        assert_eq!(set.get(BoundaryTag::TopLeft), Point::new(0.0, 0.0));
        assert_eq!(set.get(BoundaryTag::BottomRight), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_translated() {
        let q = Quantizer::default();
        let set = BoundaryPointSet::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &q);
        let moved = set.translated(5.0, -2.0, &q);
        assert_eq!(moved.get(BoundaryTag::MidBottom), Point::new(10.0, 8.0));
        assert_eq!(moved.rect(), Rect::new(5.0, -2.0, 15.0, 8.0));
    }
}
