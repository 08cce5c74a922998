//! Distance callouts between the moving shape and its aligned neighbors.

use crate::bounds::{BoundaryPointSet, BoundaryTag, Quantizer};
use crate::collision::CollisionResult;
use crate::index::{Axis, SnapPoint};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Side of the moving shape a label measures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelDirection {
    Left,
    Right,
    Top,
    Bottom,
}

impl LabelDirection {
    /// Check if the measurement segment is vertical.
    pub fn is_vertical(self) -> bool {
        matches!(self, LabelDirection::Top | LabelDirection::Bottom)
    }
}

/// A measurement from one of the moving shape's edges to a neighbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceLabel {
    /// The neighbor point being measured to.
    pub snap_point: SnapPoint,
    /// Segment start (the moving shape's edge midpoint).
    pub start: Point,
    /// Segment end, level with the neighbor point.
    pub end: Point,
    /// Midpoint of the segment.
    pub mid: Point,
    /// Label anchor, pushed off the segment by the screen margin.
    pub position: Point,
    pub distance: f64,
    pub direction: LabelDirection,
    pub text: String,
}

/// Drop the neighbor's own center ticks for a measurement axis.
///
/// Vertical lines (`Axis::X`) are measured top/bottom, so `mid-left` and
/// `mid-right` points, which mark the neighbor's vertical center, are skipped.
/// Horizontal lines skip `mid-top` and `mid-bottom`.
pub fn filter_mid_points(axis: Axis, points: &[SnapPoint]) -> impl Iterator<Item = &SnapPoint> {
    points.iter().filter(move |p| match axis {
        Axis::X => !matches!(p.tag, BoundaryTag::MidLeft | BoundaryTag::MidRight),
        Axis::Y => !matches!(p.tag, BoundaryTag::MidTop | BoundaryTag::MidBottom),
    })
}

/// Compute the distance labels for one axis.
///
/// `active` must already be limited to lines the moving shape sits on.
/// Each side yields its nearest point strictly beyond the edge midpoint;
/// when both sides measure the same distance both labels are kept,
/// otherwise only the shorter one. `margin` is the text offset in scene units.
pub fn distance_labels(
    axis: Axis,
    moving: &BoundaryPointSet,
    active: &[&CollisionResult],
    margin: f64,
    quantizer: &Quantizer,
) -> Vec<DistanceLabel> {
    let (near, far) = match axis {
        Axis::X => (LabelDirection::Top, LabelDirection::Bottom),
        Axis::Y => (LabelDirection::Left, LabelDirection::Right),
    };

    let near = nearest_beyond(axis, near, moving, active)
        .map(|(p, d)| build_label(near, moving, p, d, margin, quantizer));
    let far = nearest_beyond(axis, far, moving, active)
        .map(|(p, d)| build_label(far, moving, p, d, margin, quantizer));

    match (near, far) {
        (Some(a), Some(b)) => {
            if quantizer.key(a.distance) == quantizer.key(b.distance) {
                vec![a, b]
            } else if b.distance < a.distance {
                vec![b]
            } else {
                vec![a]
            }
        }
        (Some(a), None) | (None, Some(a)) => vec![a],
        (None, None) => Vec::new(),
    }
}

fn edge_midpoint(moving: &BoundaryPointSet, direction: LabelDirection) -> Point {
    moving.get(match direction {
        LabelDirection::Left => BoundaryTag::MidLeft,
        LabelDirection::Right => BoundaryTag::MidRight,
        LabelDirection::Top => BoundaryTag::MidTop,
        LabelDirection::Bottom => BoundaryTag::MidBottom,
    })
}

/// Signed distance from the edge midpoint outward to `point`; positive means
/// strictly beyond the edge.
fn outward_distance(direction: LabelDirection, edge: Point, point: Point) -> f64 {
    match direction {
        LabelDirection::Left => edge.x - point.x,
        LabelDirection::Right => point.x - edge.x,
        LabelDirection::Top => edge.y - point.y,
        LabelDirection::Bottom => point.y - edge.y,
    }
}

fn nearest_beyond(
    axis: Axis,
    direction: LabelDirection,
    moving: &BoundaryPointSet,
    active: &[&CollisionResult],
) -> Option<(SnapPoint, f64)> {
    let edge = edge_midpoint(moving, direction);
    let mut best: Option<(SnapPoint, f64)> = None;
    for collision in active {
        for point in filter_mid_points(axis, &collision.collision_points) {
            let distance = outward_distance(direction, edge, point.point);
            if distance <= 0.0 {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((*point, distance));
            }
        }
    }
    best
}

fn build_label(
    direction: LabelDirection,
    moving: &BoundaryPointSet,
    snap_point: SnapPoint,
    distance: f64,
    margin: f64,
    quantizer: &Quantizer,
) -> DistanceLabel {
    let start = edge_midpoint(moving, direction);
    let end = if direction.is_vertical() {
        Point::new(start.x, snap_point.point.y)
    } else {
        Point::new(snap_point.point.x, start.y)
    };
    let mid = start.midpoint(end);
    let position = if direction.is_vertical() {
        Point::new(mid.x + margin, mid.y)
    } else {
        Point::new(mid.x, mid.y - margin)
    };
    let distance = quantizer.round(distance);

    DistanceLabel {
        snap_point,
        start,
        end,
        mid,
        position,
        distance,
        direction,
        text: distance.round().to_string(),
    }
}
