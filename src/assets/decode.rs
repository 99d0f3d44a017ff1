use std::sync::Arc;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};

use crate::foundation::core::{MAX_RASTER_DIM, Size};
use crate::foundation::error::{GearError, GearResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Natural size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Parsed SVG document.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size declared by the document.
    pub fn size(&self) -> Size {
        let s = self.tree.size();
        Size::new(f64::from(s.width()), f64::from(s.height()))
    }
}

/// A decoded graphic usable as background or overlay source.
#[derive(Clone, Debug)]
pub enum PreparedGraphic {
    /// Bitmap image (PNG, JPEG, ...).
    Raster(PreparedImage),
    /// Vector image, rasterized at draw time.
    Svg(PreparedSvg),
}

impl PreparedGraphic {
    /// Natural size used for aspect-ratio computations.
    pub fn natural_size(&self) -> Size {
        match self {
            Self::Raster(img) => img.size(),
            Self::Svg(svg) => svg.size(),
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> GearResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(GearError::decode("image bytes are empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| GearError::decode(format!("decode image from memory: {e}")))?;
    let (width, height) = (dyn_img.width(), dyn_img.height());
    if width == 0 || height == 0 {
        return Err(GearError::decode("image has zero width or height"));
    }
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(GearError::decode(format!(
            "image {width}x{height} exceeds {MAX_RASTER_DIM}px per side"
        )));
    }
    let rgba = dyn_img.to_rgba8();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> GearResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| GearError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode bytes as a raster image when they carry a known image signature, otherwise as SVG.
pub fn decode_graphic(bytes: &[u8]) -> GearResult<PreparedGraphic> {
    if image::guess_format(bytes).is_ok() {
        return Ok(PreparedGraphic::Raster(decode_image(bytes)?));
    }
    match parse_svg(bytes) {
        Ok(svg) => Ok(PreparedGraphic::Svg(svg)),
        Err(e) => Err(GearError::decode(format!(
            "bytes are neither a known raster format nor SVG ({e})"
        ))),
    }
}

/// Extract the payload of a `data:` URL such as a browser file reader produces.
///
/// Only base64 payloads are accepted; images are binary.
pub fn decode_data_url(url: &str) -> GearResult<Vec<u8>> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| GearError::decode("data url must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| GearError::decode("data url is missing ',' separator"))?;
    if !meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(GearError::decode("data url payload must be base64"));
    }
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode base64 data url payload")?;
    Ok(bytes)
}

/// Encode bytes as a `data:` URL with the given MIME type.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
