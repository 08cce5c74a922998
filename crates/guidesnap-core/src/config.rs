//! Engine configuration, resolved once per session.

use crate::bounds::{MAX_PRECISION, Quantizer};
use crate::error::{SnapError, SnapResult};
use crate::spacing::DEFAULT_SPACING_TOLERANCE;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Default snap tolerance in screen pixels.
pub const DEFAULT_TOLERANCE_PX: f64 = 5.0;
/// Default distance between a measurement segment and its label, in screen pixels.
pub const DEFAULT_LABEL_MARGIN_PX: f64 = 4.0;
/// Default number of guide lines rendered per axis.
pub const DEFAULT_MAX_GUIDE_LINES: usize = 3;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default guide color: pink.
    pub fn guide() -> Self {
        Self::new(236, 72, 153, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Cosmetic settings for the rendered guides. Geometry never reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideStyle {
    pub color: SerializableColor,
    /// Stroke width in screen pixels.
    pub stroke_width: f64,
    /// Dash pattern in screen pixels (empty = solid).
    pub dash: Vec<f64>,
    /// Point marker size in screen pixels.
    pub point_size: f64,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::guide(),
            stroke_width: 1.0,
            dash: Vec::new(),
            point_size: 4.0,
        }
    }
}

impl GuideStyle {
    /// Get the guide color as a peniko Color.
    pub fn color(&self) -> Color {
        self.color.into()
    }
}

/// Snapping configuration.
///
/// Missing fields take their defaults when deserialized. Call
/// [`SnapConfig::validate`] (done by the engine constructor) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snap tolerance in screen pixels.
    pub tolerance_px: f64,
    /// Only consider candidates inside the visible viewport.
    pub viewport_only: bool,
    /// Decimal digits kept when rounding coordinates.
    pub precision: u32,
    /// Absolute tolerance for equal gaps, in scene units.
    pub spacing_tolerance: f64,
    /// Offset of distance labels from their segment, in screen pixels.
    pub label_margin_px: f64,
    /// Guide lines rendered per axis (0 = no cap).
    pub max_guide_lines: usize,
    /// Also snap to the edges of the moving shape's container.
    pub snap_to_container: bool,
    pub show_lines: bool,
    pub show_points: bool,
    pub show_distance_labels: bool,
    pub show_equal_spacing: bool,
    pub style: GuideStyle,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance_px: DEFAULT_TOLERANCE_PX,
            viewport_only: false,
            precision: 2,
            spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
            label_margin_px: DEFAULT_LABEL_MARGIN_PX,
            max_guide_lines: DEFAULT_MAX_GUIDE_LINES,
            snap_to_container: true,
            show_lines: true,
            show_points: true,
            show_distance_labels: true,
            show_equal_spacing: true,
            style: GuideStyle::default(),
        }
    }
}

impl SnapConfig {
    /// Check every option, reporting the first invalid one.
    pub fn validate(&self) -> SnapResult<()> {
        if !self.tolerance_px.is_finite() || self.tolerance_px < 0.0 {
            return Err(SnapError::InvalidTolerance(self.tolerance_px));
        }
        if self.precision > MAX_PRECISION {
            return Err(SnapError::InvalidPrecision(self.precision));
        }
        if !self.spacing_tolerance.is_finite() || self.spacing_tolerance < 0.0 {
            return Err(SnapError::InvalidSpacingTolerance(self.spacing_tolerance));
        }
        if !self.label_margin_px.is_finite() {
            return Err(SnapError::InvalidLabelMargin(self.label_margin_px));
        }
        Ok(())
    }

    /// Build the quantizer for the configured precision.
    pub fn quantizer(&self) -> SnapResult<Quantizer> {
        Quantizer::new(self.precision)
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> SnapResult<Self> {
        let config: SnapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
