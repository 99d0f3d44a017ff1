use crate::foundation::core::{Canvas, MAX_RASTER_DIM, Size};
use crate::foundation::error::{GearError, GearResult};

/// Canvas for a background of `natural` size shown at a fixed `display_width`.
///
/// Height keeps the source aspect ratio and is rounded to the nearest pixel (at least 1).
/// Backgrounds so tall that the height would exceed [`MAX_RASTER_DIM`] are rejected.
pub fn fit_to_width(display_width: u32, natural: Size) -> GearResult<Canvas> {
    if !(natural.width.is_finite() && natural.height.is_finite())
        || natural.width <= 0.0
        || natural.height <= 0.0
    {
        return Err(GearError::validation(format!(
            "background must have a positive size, got {}x{}",
            natural.width, natural.height
        )));
    }
    let height = (f64::from(display_width) * natural.height / natural.width)
        .round()
        .max(1.0);
    if height > f64::from(MAX_RASTER_DIM) {
        return Err(GearError::validation("background aspect ratio is too extreme"));
    }
    Canvas::new(display_width, height as u32)
}

/// Size of a freshly added overlay: fixed height, width from the asset's aspect ratio.
///
/// Degenerate assets fall back to a square.
pub fn default_overlay_size(target_height: f64, natural: Size) -> Size {
    let aspect = natural.width / natural.height;
    if aspect.is_finite() && aspect > 0.0 {
        Size::new(target_height * aspect, target_height)
    } else {
        Size::new(target_height, target_height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sizing.rs"]
mod tests;
