use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::encode_data_url;
use crate::foundation::error::{GearError, GearResult};
use crate::render::frame::FrameRGBA;

/// A flattened, encoded scene ready to be offered as a download.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    /// File name the download is offered under.
    pub filename: String,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl ExportedImage {
    /// Encode `frame` as PNG under `filename`.
    pub fn from_frame(frame: FrameRGBA, filename: impl Into<String>) -> GearResult<Self> {
        let (width, height) = (frame.width, frame.height);
        let png = encode_png(frame)?;
        Ok(Self {
            filename: filename.into(),
            png,
            width,
            height,
        })
    }

    /// The image as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> String {
        encode_data_url("image/png", &self.png)
    }

    /// Write the PNG to `dir/<filename>`, creating `dir` if needed. Existing files are replaced.
    pub fn write_to_dir(&self, dir: &Path) -> GearResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "wrote export");
        Ok(path)
    }
}

/// Encode a frame as PNG, un-premultiplying first when needed.
pub fn encode_png(frame: FrameRGBA) -> GearResult<Vec<u8>> {
    let frame = frame.into_straight();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or_else(|| GearError::export("frame byte length does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| GearError::export(format!("encode png: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
