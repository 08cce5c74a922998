//! Guide geometry handed to the renderer each tick.

use crate::bounds::{BoundaryPointSet, Quantizer};
use crate::collision::CollisionResult;
use crate::index::Axis;
use crate::labels::DistanceLabel;
use crate::shapes::ShapeId;
use crate::spacing::EqualSpacingResult;
use kurbo::{Line, Point};
use serde::{Deserialize, Serialize};

/// A guide line drawn along an active alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideSegment {
    pub axis: Axis,
    /// Shared coordinate of the alignment.
    pub value: f64,
    pub start: Point,
    pub end: Point,
}

impl GuideSegment {
    /// Convert to a kurbo line for stroking.
    pub fn to_line(&self) -> Line {
        Line::new(self.start, self.end)
    }
}

/// A tick mark on a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMarker {
    pub position: Point,
    /// Owner of the point; None for the moving selection.
    ///
    /// The owner may have been removed since the index was built; renderers
    /// look it up and skip markers whose shape is gone.
    pub shape: Option<ShapeId>,
}

/// Everything the renderer draws for the current tick.
///
/// The engine clears the vectors between ticks and only replaces the whole
/// overlay when a gesture ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideOverlay {
    pub lines: Vec<GuideSegment>,
    pub points: Vec<PointMarker>,
    pub labels: Vec<DistanceLabel>,
    pub spacings: Vec<EqualSpacingResult>,
}

impl GuideOverlay {
    /// Hide everything, keeping allocations.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.points.clear();
        self.labels.clear();
        self.spacings.clear();
    }

    /// Check if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty() && self.labels.is_empty() && self.spacings.is_empty()
    }

    /// Add the guide line for an active alignment.
    pub fn push_line(&mut self, collision: &CollisionResult, live: &BoundaryPointSet, quantizer: &Quantizer) {
        if let Some(segment) = guide_segment(collision, live, quantizer) {
            self.lines.push(segment);
        }
    }

    /// Add tick marks for an active alignment: neighbor points first, then
    /// the moving selection's own points on the line.
    pub fn push_points(&mut self, collision: &CollisionResult, live: &BoundaryPointSet, quantizer: &Quantizer) {
        self.points.extend(collision.collision_points.iter().map(|p| PointMarker {
            position: p.point,
            shape: Some(p.shape),
        }));
        self.points.extend(points_on_line(collision, live, quantizer).map(|position| PointMarker {
            position,
            shape: None,
        }));
    }
}

/// Keep at most `max` alignments per axis, nearest first. `0` keeps all.
///
/// Only applied when rendering; detection and selection always see every line.
pub fn nearest_lines<'a>(active: &[&'a CollisionResult], max: usize) -> Vec<&'a CollisionResult> {
    let mut lines = active.to_vec();
    lines.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    if max > 0 {
        lines.truncate(max);
    }
    lines
}

/// Build the segment covering the neighbor points and the moving selection.
pub fn guide_segment(collision: &CollisionResult, live: &BoundaryPointSet, quantizer: &Quantizer) -> Option<GuideSegment> {
    let axis = collision.axis();
    let ortho = axis.orthogonal();
    let value = collision.line.value;

    let (min, max) = collision
        .collision_points
        .iter()
        .map(|p| p.point)
        .chain(points_on_line(collision, live, quantizer))
        .map(|p| ortho.coord(p))
        .fold(None, |acc: Option<(f64, f64)>, c| match acc {
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
            None => Some((c, c)),
        })?;

    let (start, end) = match axis {
        Axis::X => (Point::new(value, min), Point::new(value, max)),
        Axis::Y => (Point::new(min, value), Point::new(max, value)),
    };
    Some(GuideSegment { axis, value, start, end })
}

fn points_on_line<'a>(
    collision: &'a CollisionResult,
    live: &'a BoundaryPointSet,
    quantizer: &'a Quantizer,
) -> impl Iterator<Item = Point> + 'a {
    let axis = collision.axis();
    let key = quantizer.key(collision.line.value);
    live.iter()
        .map(|(_, p)| p)
        .filter(move |&p| quantizer.key(axis.coord(p)) == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::detect_collisions;
    use crate::index::SnapIndex;
    use crate::shapes::{Block, SnapShape};
    use kurbo::Rect;

    fn collisions(blocks: &[Block], moving: Rect, axis: Axis, tolerance: f64) -> (Vec<CollisionResult>, BoundaryPointSet) {
        let q = Quantizer::default();
        let index = SnapIndex::build(blocks.iter().map(|b| b as &dyn SnapShape), &q);
        let live = BoundaryPointSet::from_rect(moving, &q);
        (detect_collisions(axis, &live, &index, tolerance, &q), live)
    }

    #[test]
    fn test_segment_spans_neighbor_and_moving() {
        let q = Quantizer::default();
        let above = Block::new(Point::new(0.0, 0.0), 100.0, 50.0);
        let (results, live) = collisions(&[above], Rect::new(0.0, 200.0, 40.0, 240.0), Axis::X, 0.0);
        let left = results.iter().find(|r| r.line.value == 0.0).unwrap();

        let segment = guide_segment(left, &live, &q).unwrap();
        assert_eq!(segment.start, Point::new(0.0, 0.0));
        assert_eq!(segment.end, Point::new(0.0, 240.0));
        assert!((segment.to_line().length() - 240.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_horizontal_segment() {
        let q = Quantizer::default();
        let left = Block::new(Point::new(0.0, 0.0), 50.0, 50.0);
        let (results, live) = collisions(&[left], Rect::new(100.0, 50.0, 130.0, 80.0), Axis::Y, 0.0);
        let bottom = results.iter().find(|r| r.line.value == 50.0).unwrap();

        let segment = guide_segment(bottom, &live, &q).unwrap();
        assert_eq!(segment.axis, Axis::Y);
        assert_eq!(segment.start, Point::new(0.0, 50.0));
        assert_eq!(segment.end, Point::new(130.0, 50.0));
    }

    #[test]
    fn test_markers_tag_owner() {
        let q = Quantizer::default();
        let above = Block::new(Point::new(0.0, 0.0), 100.0, 50.0);
        let id = above.id;
        let (results, live) = collisions(&[above], Rect::new(0.0, 200.0, 40.0, 240.0), Axis::X, 0.0);
        let left = results.iter().find(|r| r.line.value == 0.0).unwrap();

        let mut overlay = GuideOverlay::default();
        overlay.push_points(left, &live, &q);
        assert_eq!(overlay.points.iter().filter(|m| m.shape == Some(id)).count(), 3);
        assert_eq!(overlay.points.iter().filter(|m| m.shape.is_none()).count(), 3);
    }

    #[test]
    fn test_nearest_lines_cap() {
        let blocks = [
            Block::new(Point::new(0.0, 0.0), 10.0, 10.0),
            Block::new(Point::new(12.0, 100.0), 10.0, 10.0),
        ];
        // Lines at 0, 5, 10, 12, 17, 22 against live edges 10..20
        let (results, _) = collisions(&blocks, Rect::new(10.0, 300.0, 20.0, 310.0), Axis::X, 3.0);
        let all: Vec<&CollisionResult> = results.iter().collect();
        assert!(all.len() > 2);

        let capped = nearest_lines(&all, 2);
        assert_eq!(capped.len(), 2);
        assert!(capped[0].distance <= capped[1].distance);
        assert!((capped[0].distance).abs() < f64::EPSILON);

        assert_eq!(nearest_lines(&all, 0).len(), all.len());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let q = Quantizer::default();
        let above = Block::new(Point::new(0.0, 0.0), 100.0, 50.0);
        let (results, live) = collisions(&[above], Rect::new(0.0, 200.0, 40.0, 240.0), Axis::X, 0.0);

        let mut overlay = GuideOverlay::default();
        for result in &results {
            overlay.push_line(result, &live, &q);
            overlay.push_points(result, &live, &q);
        }
        assert!(!overlay.is_empty());
        let capacity = overlay.points.capacity();
        overlay.clear();
        assert!(overlay.is_empty());
        assert_eq!(overlay.points.capacity(), capacity);
    }
}
