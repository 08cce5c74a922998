//! Candidate alignment lines built from sibling shapes' boundary points.

use crate::bounds::{BoundaryPointSet, BoundaryTag, Quantizer};
use crate::shapes::{CoordinateSpace, ShapeId, SnapShape};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapping axis.
///
/// Lines on the `X` axis are vertical (`x = value`); lines on the `Y` axis
/// are horizontal (`y = value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Both axes, X first.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// The coordinate of a point along this axis.
    pub fn coord(self, point: Point) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }

    /// The other axis.
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A boundary point captured from a candidate shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    /// Position in root space (quantized).
    pub point: Point,
    /// Which boundary position this is.
    pub tag: BoundaryTag,
    /// Shape the point came from. Not kept alive by the index.
    pub shape: ShapeId,
}

/// A group of snap points sharing one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapLine {
    pub axis: Axis,
    /// The shared coordinate along `axis`.
    pub value: f64,
    /// Points on the line, ordered by the orthogonal coordinate.
    pub points: Vec<SnapPoint>,
}

impl SnapLine {
    /// Minimum and maximum orthogonal coordinate covered by the line's points.
    pub fn span(&self) -> Option<(f64, f64)> {
        let ortho = self.axis.orthogonal();
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((ortho.coord(first.point), ortho.coord(last.point)))
    }
}

/// Static line index for one gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapIndex {
    /// Vertical lines, ascending by value.
    pub x_lines: Vec<SnapLine>,
    /// Horizontal lines, ascending by value.
    pub y_lines: Vec<SnapLine>,
}

impl SnapIndex {
    /// Build the index from the eligible candidate shapes.
    pub fn build<'a>(
        shapes: impl IntoIterator<Item = &'a dyn SnapShape>,
        quantizer: &Quantizer,
    ) -> Self {
        let points = shapes.into_iter().flat_map(|shape| {
            let id = shape.id();
            let set = BoundaryPointSet::of_shape(shape, CoordinateSpace::Root, quantizer);
            BoundaryTag::ALL.into_iter().map(move |tag| SnapPoint {
                point: set.get(tag),
                tag,
                shape: id,
            })
        });
        Self::from_points(points, quantizer)
    }

    /// Group already-extracted snap points into lines.
    pub fn from_points(points: impl IntoIterator<Item = SnapPoint>, quantizer: &Quantizer) -> Self {
        let mut by_x: HashMap<i64, Vec<SnapPoint>> = HashMap::new();
        let mut by_y: HashMap<i64, Vec<SnapPoint>> = HashMap::new();

        for snap_point in points {
            by_x.entry(quantizer.key(snap_point.point.x))
                .or_default()
                .push(snap_point);
            by_y.entry(quantizer.key(snap_point.point.y))
                .or_default()
                .push(snap_point);
        }

        Self {
            x_lines: collect_lines(Axis::X, by_x),
            y_lines: collect_lines(Axis::Y, by_y),
        }
    }

    /// Lines for one axis.
    pub fn lines(&self, axis: Axis) -> &[SnapLine] {
        match axis {
            Axis::X => &self.x_lines,
            Axis::Y => &self.y_lines,
        }
    }

    /// Total number of lines on both axes.
    pub fn len(&self) -> usize {
        self.x_lines.len() + self.y_lines.len()
    }

    /// Check if the index has no lines.
    pub fn is_empty(&self) -> bool {
        self.x_lines.is_empty() && self.y_lines.is_empty()
    }
}

fn collect_lines(axis: Axis, groups: HashMap<i64, Vec<SnapPoint>>) -> Vec<SnapLine> {
    let ortho = axis.orthogonal();
    let mut lines: Vec<SnapLine> = groups
        .into_values()
        .map(|mut points| {
            // Stable sort keeps insertion order among equal coordinates
            points.sort_by(|a, b| ortho.coord(a.point).total_cmp(&ortho.coord(b.point)));
            SnapLine {
                axis,
                value: axis.coord(points[0].point),
                points,
            }
        })
        .collect();
    lines.sort_by(|a, b| a.value.total_cmp(&b.value));
    lines
}
