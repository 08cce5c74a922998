//! Viewport camera: zoom validation and screen-to-scene conversions.

use crate::error::{SnapError, SnapResult};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The host's view onto the scene.
///
/// Pixel-based settings (snap tolerance, label margin) are divided by the
/// zoom so they stay constant on screen at every zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = one scene unit per pixel).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Size of the visible area in screen pixels.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            size: Size::new(1280.0, 800.0),
        }
    }
}

impl Viewport {
    /// Create a viewport of the given screen size at 100% zoom.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Check that the zoom is usable for pixel-to-scene conversions.
    pub fn validate(&self) -> SnapResult<()> {
        validate_zoom(self.zoom)
    }

    /// Set the zoom level, rejecting non-positive or non-finite values.
    pub fn set_zoom(&mut self, zoom: f64) -> SnapResult<()> {
        validate_zoom(zoom)?;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        Ok(())
    }

    /// Screen-to-scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to scene coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a length in screen pixels to scene units.
    pub fn screen_to_world_distance(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// The scene rectangle currently on screen.
    pub fn visible_world_rect(&self) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(self.size.width, self.size.height));
        Rect::from_points(top_left, bottom_right)
    }
}

fn validate_zoom(zoom: f64) -> SnapResult<()> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(SnapError::InvalidZoom(zoom));
    }
    Ok(())
}
