use crate::foundation::core::Affine;
use crate::foundation::error::{GearError, GearResult};

const MAX_DIM: u32 = 8_192;

/// Compute a raster size for an SVG given the transform it will be drawn with.
///
/// The returned `(width, height, transform_adjust)` are used as:
///
/// - rasterize the SVG into a pixmap of `(width, height)`
/// - draw the resulting image with `transform_adjust` (not the original transform)
///
/// so scaled-up gear stays crisp instead of being upsampled from its intrinsic size.
pub fn svg_raster_params(tree: &usvg::Tree, transform: Affine) -> GearResult<(u32, u32, Affine)> {
    fn to_px(v: f32) -> GearResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(GearError::render("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let base_w = to_px(size.width())?;
    let base_h = to_px(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = ((base_w as f64) * sx).ceil().clamp(1.0, f64::from(MAX_DIM)) as u32;
    let h = ((base_h as f64) * sy).ceil().clamp(1.0, f64::from(MAX_DIM)) as u32;

    // Map raster pixels back into the SVG's own coordinate space before the draw transform.
    let inv = Affine::scale_non_uniform(
        f64::from(size.width()) / f64::from(w),
        f64::from(size.height()) / f64::from(h),
    );
    Ok((w, h, transform * inv))
}

/// Rasterize `tree` stretched to `width x height`, returning premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> GearResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GearError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
