//! Collision detection between a moving shape and the line index.

use crate::bounds::{BoundaryPointSet, Quantizer};
use crate::index::{Axis, SnapIndex, SnapLine, SnapPoint};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A snap line that one or more live boundary points fall within tolerance of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// The line that was hit.
    pub line: SnapLine,
    /// The line's points with duplicate positions removed.
    pub collision_points: Vec<SnapPoint>,
    /// Live points within tolerance of the line, in evaluation order.
    pub target_points: Vec<Point>,
    /// Signed `target[axis] - line.value` for the nearest live point.
    pub offset: f64,
    /// `|offset|`.
    pub distance: f64,
}

impl CollisionResult {
    pub fn axis(&self) -> Axis {
        self.line.axis
    }

    /// Check if one of the given boundary points lies exactly on this line.
    ///
    /// Used after the offset is applied to tell active alignments apart from
    /// lines that were merely within tolerance.
    pub fn is_active(&self, live: &BoundaryPointSet, quantizer: &Quantizer) -> bool {
        let key = quantizer.key(self.line.value);
        live.iter()
            .any(|(_, p)| quantizer.key(self.line.axis.coord(p)) == key)
    }
}

/// Test the live boundary points against every line of one axis.
///
/// A line is reported only if its nearest live point is within `tolerance`
/// (inclusive). Ties between live points keep the first one evaluated.
pub fn detect_collisions(
    axis: Axis,
    live: &BoundaryPointSet,
    index: &SnapIndex,
    tolerance: f64,
    quantizer: &Quantizer,
) -> Vec<CollisionResult> {
    let mut results = Vec::new();

    for line in index.lines(axis) {
        let mut nearest: Option<(f64, f64)> = None;
        let mut target_points = Vec::new();

        for (_, point) in live.iter() {
            let offset = axis.coord(point) - line.value;
            let distance = offset.abs();
            if distance > tolerance {
                continue;
            }
            target_points.push(point);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((offset, distance));
            }
        }

        if let Some((offset, distance)) = nearest {
            results.push(CollisionResult {
                line: line.clone(),
                collision_points: dedup_points(&line.points, quantizer),
                target_points,
                offset: quantizer.round(offset),
                distance: quantizer.round(distance),
            });
        }
    }

    results
}

/// Pick the collision with the smallest distance; ties keep input order.
pub fn best_match(results: &[CollisionResult]) -> Option<&CollisionResult> {
    results
        .iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Keep the first snap point at each distinct position.
fn dedup_points(points: &[SnapPoint], quantizer: &Quantizer) -> Vec<SnapPoint> {
    let mut seen = std::collections::HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| seen.insert((quantizer.key(p.point.x), quantizer.key(p.point.y))))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Block, SnapShape};
    use kurbo::Rect;

    fn index_of(blocks: &[Block]) -> SnapIndex {
        SnapIndex::build(blocks.iter().map(|b| b as &dyn SnapShape), &Quantizer::default())
    }

    fn live(rect: Rect) -> BoundaryPointSet {
        BoundaryPointSet::from_rect(rect, &Quantizer::default())
    }

    #[test]
    fn test_empty_index_yields_nothing() {
        let q = Quantizer::default();
        let index = SnapIndex::default();
        let live = live(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(detect_collisions(Axis::X, &live, &index, 5.0, &q).is_empty());
        assert!(detect_collisions(Axis::Y, &live, &index, 5.0, &q).is_empty());
    }

    #[test]
    fn test_left_edge_collision() {
        let q = Quantizer::default();
        let index = index_of(&[Block::new(Point::new(100.0, 0.0), 50.0, 50.0)]);
        // Left edge at 103: 3 units right of the candidate's left edge
        let live = live(Rect::new(103.0, 200.0, 133.0, 230.0));
        let results = detect_collisions(Axis::X, &live, &index, 5.0, &q);

        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert!((hit.line.value - 100.0).abs() < f64::EPSILON);
        assert!((hit.offset - 3.0).abs() < f64::EPSILON);
        assert!((hit.distance - 3.0).abs() < f64::EPSILON);
        // top-left, bottom-left and mid-left all sit on x = 103
        assert_eq!(hit.target_points.len(), 3);
    }

    #[test]
    fn test_offset_is_signed() {
        let q = Quantizer::default();
        let index = index_of(&[Block::new(Point::new(100.0, 0.0), 50.0, 50.0)]);
        let live = live(Rect::new(0.0, 46.0, 40.0, 98.0));
        let results = detect_collisions(Axis::Y, &live, &index, 5.0, &q);

        let hit = best_match(&results).unwrap();
        assert!((hit.line.value - 50.0).abs() < f64::EPSILON);
        assert!((hit.offset - -4.0).abs() < f64::EPSILON);
        assert!((hit.distance - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offset_correctness() {
        let q = Quantizer::default();
        let index = index_of(&[
            Block::new(Point::new(0.0, 0.0), 100.0, 100.0),
            Block::new(Point::new(300.0, 37.0), 80.0, 20.0),
        ]);
        let live = live(Rect::new(152.0, 39.5, 212.0, 99.5));
        for axis in Axis::BOTH {
            for hit in detect_collisions(axis, &live, &index, 6.0, &q) {
                let nearest = hit
                    .target_points
                    .iter()
                    .map(|&p| axis.coord(p))
                    .min_by(|a, b| (a - hit.line.value).abs().total_cmp(&(b - hit.line.value).abs()))
                    .unwrap();
                assert!((q.round(nearest - hit.offset) - hit.line.value).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let q = Quantizer::default();
        let index = index_of(&[Block::new(Point::new(100.0, 0.0), 50.0, 50.0)]);

        let at = live(Rect::new(105.0, 500.0, 115.0, 520.0));
        let results = detect_collisions(Axis::X, &at, &index, 5.0, &q);
        assert_eq!(results.len(), 1);
        assert!((results[0].distance - 5.0).abs() < f64::EPSILON);

        let beyond = live(Rect::new(105.01, 500.0, 115.01, 520.0));
        let results = detect_collisions(Axis::X, &beyond, &index, 5.0, &q);
        assert!(results.is_empty());
    }

    #[test]
    fn test_collision_points_deduplicated() {
        let q = Quantizer::default();
        // Two blocks sharing a corner at (100, 50)
        let index = index_of(&[
            Block::new(Point::new(50.0, 0.0), 50.0, 50.0),
            Block::new(Point::new(100.0, 50.0), 50.0, 50.0),
        ]);
        let live = live(Rect::new(101.0, 300.0, 121.0, 320.0));
        let results = detect_collisions(Axis::X, &live, &index, 5.0, &q);
        let hit = results.iter().find(|r| (r.line.value - 100.0).abs() < f64::EPSILON).unwrap();
        assert_eq!(hit.line.points.len(), 6);
        assert_eq!(hit.collision_points.len(), 5);
    }

    #[test]
    fn test_best_match_smallest_distance() {
        let q = Quantizer::default();
        let index = index_of(&[
            Block::new(Point::new(0.0, 0.0), 10.0, 10.0),
            Block::new(Point::new(0.0, 100.0), 10.0, 10.0),
        ]);
        // Lines at x = 0, 5, 10; live edges at -3 and 17 with center 7
        let live = live(Rect::new(-3.0, 300.0, 17.0, 310.0));
        let results = detect_collisions(Axis::X, &live, &index, 8.0, &q);
        let best = best_match(&results).unwrap();
        // center 7 vs line 5: distance 2
        assert!((best.line.value - 5.0).abs() < f64::EPSILON);
        assert!((best.distance - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_match_three_vs_seven() {
        let q = Quantizer::default();
        let index = index_of(&[Block::new(Point::new(0.0, 0.0), 100.0, 100.0)]);
        let near = detect_collisions(Axis::X, &live(Rect::new(103.0, 0.0, 123.0, 10.0)), &index, 10.0, &q);
        let far = detect_collisions(Axis::X, &live(Rect::new(107.0, 0.0, 127.0, 10.0)), &index, 10.0, &q);
        let candidates = vec![far[0].clone(), near[0].clone()];
        assert!((candidates[0].distance - 7.0).abs() < f64::EPSILON);

        let best = best_match(&candidates).unwrap();
        assert!((best.distance - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_match_ties_keep_input_order() {
        let q = Quantizer::default();
        let index = index_of(&[Block::new(Point::new(0.0, 0.0), 100.0, 100.0)]);
        let a = detect_collisions(Axis::X, &live(Rect::new(102.0, 0.0, 122.0, 10.0)), &index, 5.0, &q);
        let b = detect_collisions(Axis::X, &live(Rect::new(-22.0, 0.0, -2.0, 10.0)), &index, 5.0, &q);
        let candidates = vec![a[0].clone(), b[0].clone()];
        let best = best_match(&candidates).unwrap();
        assert!((best.line.value - 100.0).abs() < f64::EPSILON);
        assert!(best_match(&[]).is_none());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let q = Quantizer::default();
        let index = index_of(&[
            Block::new(Point::new(0.0, 0.0), 100.0, 100.0),
            Block::new(Point::new(120.0, 40.0), 30.0, 30.0),
        ]);
        let live = live(Rect::new(98.0, 38.0, 128.0, 68.0));
        let first = detect_collisions(Axis::X, &live, &index, 5.0, &q);
        let second = detect_collisions(Axis::X, &live, &index, 5.0, &q);
        assert_eq!(first, second);
    }
}
