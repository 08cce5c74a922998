//! Equal-spacing detection between the moving shape and its row/column.
//!
//! Shapes that share a row with the moving shape (their extent along the
//! orthogonal axis overlaps it) are sorted by leading edge. Consecutive gaps
//! are clustered first-fit by value; a cluster is reported when it has at
//! least two gaps and one of them sits right next to the moving shape.

use crate::bounds::Quantizer;
use crate::index::Axis;
use crate::shapes::ShapeId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default absolute tolerance for treating two gaps as equal.
pub const DEFAULT_SPACING_TOLERANCE: f64 = 1.0;

/// A shape taking part in spacing analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingCandidate {
    pub id: ShapeId,
    /// Root-space bounds.
    pub bounds: Rect,
}

impl SpacingCandidate {
    pub fn new(id: ShapeId, bounds: Rect) -> Self {
        Self { id, bounds }
    }

    fn leading(&self, axis: Axis) -> f64 {
        extent(self.bounds, axis).0
    }

    fn trailing(&self, axis: Axis) -> f64 {
        extent(self.bounds, axis).1
    }
}

/// One gap that belongs to an equal-spacing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualSpacingResult {
    /// Axis the shapes are lined up along.
    pub axis: Axis,
    /// Shape before the gap.
    pub prev_element: ShapeId,
    /// Shape after the gap.
    pub next_element: ShapeId,
    /// Gap size (always > 0).
    pub spacing: f64,
    /// Region spanning the gap.
    #[serde(rename = "box")]
    pub region: Rect,
    /// Anchor for the spacing value.
    pub label: Point,
}

#[derive(Debug, Clone, Copy)]
struct Gap {
    /// Gap sits between sorted entries `index` and `index + 1`.
    index: usize,
    value: f64,
}

#[derive(Debug)]
struct GapCluster {
    representative: f64,
    gaps: Vec<Gap>,
}

/// Find equal-spacing runs on both axes.
pub fn analyze_equal_spacing(
    moving: &SpacingCandidate,
    others: &[SpacingCandidate],
    tolerance: f64,
    quantizer: &Quantizer,
) -> Vec<EqualSpacingResult> {
    Axis::BOTH
        .into_iter()
        .flat_map(|axis| analyze_axis(axis, moving, others, tolerance, quantizer))
        .collect()
}

/// Find equal-spacing runs along one axis.
pub fn analyze_axis(
    axis: Axis,
    moving: &SpacingCandidate,
    others: &[SpacingCandidate],
    tolerance: f64,
    quantizer: &Quantizer,
) -> Vec<EqualSpacingResult> {
    let ortho = axis.orthogonal();
    let moving_extent = extent(moving.bounds, ortho);

    let mut row: Vec<&SpacingCandidate> = others
        .iter()
        .filter(|c| c.id != moving.id && overlaps(extent(c.bounds, ortho), moving_extent))
        .collect();
    if row.is_empty() {
        return Vec::new();
    }
    row.push(moving);
    row.sort_by(|a, b| a.leading(axis).total_cmp(&b.leading(axis)));

    let Some(moving_pos) = row.iter().position(|c| c.id == moving.id) else {
        return Vec::new();
    };

    let gaps: Vec<Gap> = row
        .windows(2)
        .enumerate()
        .filter_map(|(index, pair)| {
            let value = quantizer.round(pair[1].leading(axis) - pair[0].trailing(axis));
            (value > 0.0).then_some(Gap { index, value })
        })
        .collect();

    let mut results = Vec::new();
    for cluster in cluster_gaps(&gaps, tolerance) {
        if !is_valid_run(&cluster, moving_pos) {
            continue;
        }
        for gap in &cluster.gaps {
            let prev = row[gap.index];
            let next = row[gap.index + 1];
            let region = gap_region(axis, prev.bounds, next.bounds);
            results.push(EqualSpacingResult {
                axis,
                prev_element: prev.id,
                next_element: next.id,
                spacing: gap.value,
                region,
                label: region.center(),
            });
        }
    }

    if !results.is_empty() {
        log::trace!("{} equal-spacing gaps on {:?}", results.len(), axis);
    }
    results
}

/// First-fit clustering against each cluster's first value.
fn cluster_gaps(gaps: &[Gap], tolerance: f64) -> Vec<GapCluster> {
    let mut clusters: Vec<GapCluster> = Vec::new();
    for &gap in gaps {
        match clusters
            .iter_mut()
            .find(|c| (c.representative - gap.value).abs() <= tolerance)
        {
            Some(cluster) => cluster.gaps.push(gap),
            None => clusters.push(GapCluster {
                representative: gap.value,
                gaps: vec![gap],
            }),
        }
    }
    clusters
}

/// A run needs two gaps and one of them on the moving shape. Two gaps always
/// put either one on each side of it or two on the same side.
fn is_valid_run(cluster: &GapCluster, moving_pos: usize) -> bool {
    cluster.gaps.len() >= 2
        && cluster
            .gaps
            .iter()
            .any(|g| g.index == moving_pos || g.index + 1 == moving_pos)
}

/// Rectangle between two shapes: the gap along `axis`, the shared extent
/// along the other axis.
fn gap_region(axis: Axis, prev: Rect, next: Rect) -> Rect {
    let ortho = axis.orthogonal();
    let start = extent(prev, axis).1;
    let end = extent(next, axis).0;
    let (a_lo, a_hi) = extent(prev, ortho);
    let (b_lo, b_hi) = extent(next, ortho);
    let mut lo = a_lo.max(b_lo);
    let mut hi = a_hi.min(b_hi);
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    match axis {
        Axis::X => Rect::new(start, lo, end, hi),
        Axis::Y => Rect::new(lo, start, hi, end),
    }
}

fn extent(rect: Rect, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::X => (rect.x0.min(rect.x1), rect.x0.max(rect.x1)),
        Axis::Y => (rect.y0.min(rect.y1), rect.y0.max(rect.y1)),
    }
}

fn overlaps(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn candidate(x: f64, y: f64, w: f64, h: f64) -> SpacingCandidate {
        SpacingCandidate::new(Uuid::new_v4(), Rect::new(x, y, x + w, y + h))
    }

    fn analyze(moving: &SpacingCandidate, others: &[SpacingCandidate]) -> Vec<EqualSpacingResult> {
        analyze_equal_spacing(moving, others, DEFAULT_SPACING_TOLERANCE, &Quantizer::default())
    }

    #[test]
    fn test_row_of_three_plus_moving() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            candidate(110.0, 0.0, 100.0, 50.0),
            candidate(220.0, 0.0, 100.0, 50.0),
        ];
        let moving = candidate(330.0, 0.0, 100.0, 50.0);
        let results = analyze(&moving, &others);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.axis == Axis::X));
        assert!(results.iter().all(|r| (r.spacing - 10.0).abs() < f64::EPSILON));

        let last = &results[2];
        assert_eq!(last.prev_element, others[2].id);
        assert_eq!(last.next_element, moving.id);
        assert_eq!(last.region, Rect::new(320.0, 0.0, 330.0, 50.0));
        assert_eq!(last.label, Point::new(325.0, 25.0));
    }

    #[test]
    fn test_moving_between_neighbors() {
        let left = candidate(0.0, 0.0, 50.0, 50.0);
        let right = candidate(200.0, 0.0, 50.0, 50.0);
        // 70 units on each side
        let moving = candidate(120.0, 10.0, 10.0, 20.0);
        let results = analyze(&moving, &[left, right]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].prev_element, left.id);
        assert_eq!(results[0].next_element, moving.id);
        assert_eq!(results[1].prev_element, moving.id);
        assert_eq!(results[1].next_element, right.id);
        // Secondary extent is the intersection of the pair
        assert_eq!(results[0].region, Rect::new(50.0, 10.0, 120.0, 30.0));
    }

    #[test]
    fn test_one_sided_single_gap_is_not_reported() {
        let neighbor = candidate(0.0, 0.0, 100.0, 50.0);
        let moving = candidate(110.0, 0.0, 100.0, 50.0);
        assert!(analyze(&moving, &[neighbor]).is_empty());
    }

    #[test]
    fn test_unequal_gaps_not_reported() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            candidate(130.0, 0.0, 100.0, 50.0),
        ];
        // gaps of 30 and 10
        let moving = candidate(240.0, 0.0, 100.0, 50.0);
        assert!(analyze(&moving, &others).is_empty());
    }

    #[test]
    fn test_clusters_compare_against_first_gap() {
        let others = vec![
            candidate(0.0, 0.0, 10.0, 10.0),
            candidate(20.0, 0.0, 10.0, 10.0),
            candidate(40.8, 0.0, 10.0, 10.0),
        ];
        // gaps 10, 10.8, 11.6: each within 1 of the previous, but 11.6 is
        // 1.6 from the first, so the moving shape's gap stands alone
        let moving = candidate(62.4, 0.0, 10.0, 10.0);
        assert!(analyze(&moving, &others).is_empty());

        // Same row with the last gap back within 1 of the first
        let moving = candidate(61.6, 0.0, 10.0, 10.0);
        let results = analyze(&moving, &others);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].next_element, moving.id);
        assert!((results[2].spacing - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_equal_run_away_from_moving_is_ignored() {
        let others = vec![
            candidate(0.0, 0.0, 10.0, 10.0),
            candidate(20.0, 0.0, 10.0, 10.0),
            candidate(40.0, 0.0, 10.0, 10.0),
        ];
        // gaps 10, 10, then 50 to the moving shape
        let moving = candidate(100.0, 0.0, 10.0, 10.0);
        assert!(analyze(&moving, &others).is_empty());
    }

    #[test]
    fn test_gaps_within_tolerance_cluster() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            candidate(110.0, 0.0, 100.0, 50.0),
        ];
        // 10.8 is within 1 unit of 10
        let moving = candidate(220.8, 0.0, 100.0, 50.0);
        let results = analyze(&moving, &others);
        assert_eq!(results.len(), 2);
        assert!((results[1].spacing - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_shapes_produce_no_gap() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            candidate(80.0, 0.0, 100.0, 50.0),
        ];
        let moving = candidate(190.0, 0.0, 100.0, 50.0);
        assert!(analyze(&moving, &others).is_empty());
    }

    #[test]
    fn test_shapes_outside_row_ignored() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            // Same spacing but in another row
            candidate(110.0, 500.0, 100.0, 50.0),
        ];
        let moving = candidate(220.0, 0.0, 100.0, 50.0);
        assert!(analyze(&moving, &others).is_empty());
    }

    #[test]
    fn test_vertical_column() {
        let others = vec![
            candidate(0.0, 0.0, 50.0, 40.0),
            candidate(0.0, 60.0, 50.0, 40.0),
        ];
        let moving = candidate(10.0, 120.0, 30.0, 40.0);
        let results = analyze(&moving, &others);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.axis == Axis::Y));
        assert_eq!(results[1].region, Rect::new(10.0, 100.0, 40.0, 120.0));
    }

    #[test]
    fn test_empty_others() {
        let moving = candidate(0.0, 0.0, 10.0, 10.0);
        assert!(analyze(&moving, &[]).is_empty());
    }

    #[test]
    fn test_spacing_is_deterministic() {
        let others = vec![
            candidate(0.0, 0.0, 100.0, 50.0),
            candidate(110.0, 0.0, 100.0, 50.0),
            candidate(220.0, 0.0, 100.0, 50.0),
        ];
        let moving = candidate(330.0, 0.0, 100.0, 50.0);
        assert_eq!(analyze(&moving, &others), analyze(&moving, &others));
    }
}
