//! Rectangular scene node.

use super::{CoordinateSpace, ShapeId, SnapShape};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangular scene node, optionally nested in a container block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub(crate) id: ShapeId,
    /// Container this block lives in (None = scene root).
    #[serde(default)]
    pub parent: Option<ShapeId>,
    /// Top-left corner in the parent's space.
    pub position: Point,
    /// Width of the block.
    pub width: f64,
    /// Height of the block.
    pub height: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    /// Offset of the parent's origin in root space, maintained by the scene.
    #[serde(skip)]
    pub(crate) parent_origin: Vec2,
}

impl Block {
    /// Create a new block at the scene root.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            position,
            width,
            height,
            rotation: 0.0,
            parent_origin: Vec2::ZERO,
        }
    }

    /// Place this block inside a container.
    pub fn in_container(mut self, parent: ShapeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the rotation angle in radians.
    pub fn rotated(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Get the unrotated rectangle in the parent's space.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Root-space position of this block's top-left corner.
    pub fn root_origin(&self) -> Point {
        self.position + self.parent_origin
    }

    fn local_bounds(&self) -> Rect {
        let rect = self.as_rect();
        if self.rotation.abs() < 0.001 {
            return rect;
        }
        Affine::rotate_about(self.rotation, rect.center()).transform_rect_bbox(rect)
    }
}

impl SnapShape for Block {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, space: CoordinateSpace) -> Rect {
        let local = self.local_bounds();
        match space {
            CoordinateSpace::Local => local,
            CoordinateSpace::Root => local + self.parent_origin,
        }
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_creation() {
        let block = Block::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!((block.position.x - 10.0).abs() < f64::EPSILON);
        assert!((block.position.y - 20.0).abs() < f64::EPSILON);
        assert!(block.parent.is_none());
    }

    #[test]
    fn test_bounds_local_and_root() {
        let mut block = Block::new(Point::new(10.0, 20.0), 100.0, 50.0);
        block.parent_origin = Vec2::new(5.0, 5.0);

        let local = block.bounds(CoordinateSpace::Local);
        assert_eq!(local, Rect::new(10.0, 20.0, 110.0, 70.0));

        let root = block.bounds(CoordinateSpace::Root);
        assert_eq!(root, Rect::new(15.0, 25.0, 115.0, 75.0));
    }

    #[test]
    fn test_rotated_bounds_are_axis_aligned() {
        let block = Block::new(Point::new(0.0, 0.0), 100.0, 20.0)
            .rotated(std::f64::consts::FRAC_PI_2);
        let bounds = block.bounds(CoordinateSpace::Root);
        // A quarter turn swaps the extents around the center (50, 10)
        assert!((bounds.x0 - 40.0).abs() < 1e-9);
        assert!((bounds.x1 - 60.0).abs() < 1e-9);
        assert!((bounds.y0 - -40.0).abs() < 1e-9);
        assert!((bounds.y1 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_position() {
        let mut block = Block::new(Point::new(0.0, 0.0), 10.0, 10.0);
        block.set_position(Point::new(30.0, 40.0));
        assert_eq!(block.position(), Point::new(30.0, 40.0));
        assert_eq!(block.bounds(CoordinateSpace::Root).origin(), Point::new(30.0, 40.0));
    }
}
