//! Shape capability interface consumed by the snapping engine.

mod block;

pub use block::Block;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
///
/// Snap points hold this handle instead of a reference to the shape, so a
/// shape removed mid-gesture simply stops resolving.
pub type ShapeId = Uuid;

/// Coordinate frame a bounding box is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// The space of the shape's parent container.
    Local,
    /// The shared scene space. All geometry math happens here.
    #[default]
    Root,
}

/// The narrow view of a shape the engine needs.
///
/// Hosts wrap whatever scene node type they have in this trait. Bounds must
/// already be axis-aligned: rotated shapes report the box around their
/// rotated outline.
pub trait SnapShape {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the axis-aligned bounding box in the requested space.
    fn bounds(&self, space: CoordinateSpace) -> Rect;

    /// Get the position (top-left anchor) in the parent's space.
    fn position(&self) -> Point;

    /// Move the shape to a new position in the parent's space.
    fn set_position(&mut self, position: Point);
}
