use crate::foundation::error::{GearError, GearResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Largest canvas or raster side the CPU renderer can address.
pub const MAX_RASTER_DIM: u32 = u16::MAX as u32;

/// Pixel dimensions of the editing canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas with non-zero dimensions of at most [`MAX_RASTER_DIM`].
    pub fn new(width: u32, height: u32) -> GearResult<Self> {
        if width == 0 || height == 0 {
            return Err(GearError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
            return Err(GearError::validation(format!(
                "canvas {width}x{height} exceeds {MAX_RASTER_DIM}px per side"
            )));
        }
        Ok(Self { width, height })
    }

    /// Full canvas rectangle in pixel space, anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Return `true` when `p` lies inside the canvas.
    pub fn contains(self, p: Point) -> bool {
        self.rect().contains(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
