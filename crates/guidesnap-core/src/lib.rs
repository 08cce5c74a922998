//! GuideSnap Core Library
//!
//! Alignment and snapping engine for interactive 2D scene editors: boundary
//! point extraction, line indexing, collision detection, equal-spacing hints
//! and distance labels, driven by a per-gesture state machine.

pub mod bounds;
pub mod camera;
pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod guides;
pub mod index;
pub mod input;
pub mod labels;
pub mod scene;
pub mod shapes;
pub mod spacing;

pub use bounds::{BoundaryPointSet, BoundaryTag, Quantizer};
pub use camera::Viewport;
pub use collision::{CollisionResult, best_match, detect_collisions};
pub use config::{GuideStyle, SerializableColor, SnapConfig};
pub use engine::{GestureState, SnapEngine, SnapOffset, SnapSession, TickOutput};
pub use error::{SnapError, SnapResult};
pub use guides::{GuideOverlay, GuideSegment, PointMarker};
pub use index::{Axis, SnapIndex, SnapLine, SnapPoint};
pub use input::{ArrowKey, GestureEvent};
pub use labels::{DistanceLabel, LabelDirection, distance_labels};
pub use scene::{Scene, SceneFile, SceneHost};
pub use shapes::{Block, CoordinateSpace, ShapeId, SnapShape};
pub use spacing::{EqualSpacingResult, SpacingCandidate, analyze_equal_spacing};
