//! Error types for engine setup and scene mutation.

use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors reported when the engine or its collaborators are set up with
/// unusable inputs.
///
/// Nothing in the per-tick geometry path returns these: an empty scene or a
/// gesture with nothing nearby resolves to empty results instead.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("Invalid snap tolerance: {0} (must be finite and >= 0)")]
    InvalidTolerance(f64),
    #[error("Invalid precision: {0} decimal digits (max {max})", max = crate::bounds::MAX_PRECISION)]
    InvalidPrecision(u32),
    #[error("Invalid spacing tolerance: {0} (must be finite and >= 0)")]
    InvalidSpacingTolerance(f64),
    #[error("Invalid label margin: {0} (must be finite)")]
    InvalidLabelMargin(f64),
    #[error("Invalid zoom level: {0} (must be finite and > 0)")]
    InvalidZoom(f64),
    #[error("Unknown shape: {0}")]
    UnknownShape(ShapeId),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for setup operations.
pub type SnapResult<T> = Result<T, SnapError>;

impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        SnapError::Serialization(err.to_string())
    }
}
