//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid config file.

use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{MAX_RASTER_DIM, Point, Size};
use crate::foundation::error::{GearError, GearResult};

/// Smallest on-screen box an overlay may be resized to.
///
/// A resize proposal whose effective width or height falls below the minimum is rejected and
/// the overlay keeps its previous geometry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MinSizePolicy {
    /// Minimum effective width in canvas pixels.
    pub width: f64,
    /// Minimum effective height in canvas pixels.
    pub height: f64,
}

impl Default for MinSizePolicy {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 20.0,
        }
    }
}

impl MinSizePolicy {
    /// Return `true` when a box of `size` satisfies the policy.
    pub fn allows(&self, size: Size) -> bool {
        size.width >= self.width && size.height >= self.height
    }
}

/// Tunables for an editing session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Fixed display width of the canvas; height follows the background's aspect ratio.
    pub display_width: u32,
    /// Height of a freshly added overlay.
    pub overlay_default_height: f64,
    /// Top-left position of a freshly added overlay.
    pub overlay_default_offset: [f64; 2],
    /// Resize floor enforced by the transform control.
    pub min_overlay_size: MinSizePolicy,
    /// Vertical gap between an overlay's top edge and its removal affordance.
    pub affordance_margin: f64,
    /// Radius of the removal affordance marker (drawing and hit-testing).
    pub affordance_radius: f64,
    /// File name used for exported images.
    pub export_filename: String,
    /// Straight-alpha RGBA color the canvas is cleared to before drawing.
    pub clear_rgba: [u8; 4],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display_width: 800,
            overlay_default_height: 100.0,
            overlay_default_offset: [50.0, 50.0],
            min_overlay_size: MinSizePolicy::default(),
            affordance_margin: 10.0,
            affordance_radius: 10.0,
            export_filename: "edited-image.png".to_string(),
            clear_rgba: [255, 255, 255, 255],
        }
    }
}

impl EditorConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> GearResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> GearResult<()> {
        if self.display_width == 0 || self.display_width > MAX_RASTER_DIM {
            return Err(GearError::validation(format!(
                "display_width must be in 1..={MAX_RASTER_DIM}"
            )));
        }
        if !self.overlay_default_height.is_finite() || self.overlay_default_height <= 0.0 {
            return Err(GearError::validation(
                "overlay_default_height must be finite and > 0",
            ));
        }
        if self.overlay_default_offset.iter().any(|v| !v.is_finite()) {
            return Err(GearError::validation("overlay_default_offset must be finite"));
        }
        let min = self.min_overlay_size;
        if !(min.width.is_finite() && min.height.is_finite()) || min.width < 0.0 || min.height < 0.0
        {
            return Err(GearError::validation(
                "min_overlay_size must be finite and >= 0",
            ));
        }
        if !self.affordance_margin.is_finite() {
            return Err(GearError::validation("affordance_margin must be finite"));
        }
        if !self.affordance_radius.is_finite() || self.affordance_radius <= 0.0 {
            return Err(GearError::validation(
                "affordance_radius must be finite and > 0",
            ));
        }
        let name = self.export_filename.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(GearError::validation(
                "export_filename must be a bare, non-empty file name",
            ));
        }
        Ok(())
    }

    /// Default top-left position of new overlays.
    pub fn overlay_origin(&self) -> Point {
        Point::new(self.overlay_default_offset[0], self.overlay_default_offset[1])
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
