use std::io::Cursor;

use crate::assets::decode::PreparedImage;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::render::frame::FrameRGBA;

/// File name of the exported composite.
pub const EXPORT_FILE_NAME: &str = "text-behind-image.png";
/// MIME type of the exported composite.
pub const EXPORT_MIME: &str = "image/png";

#[derive(Clone, Debug)]
/// Encoded file ready to hand to a [`crate::DownloadSink`].
pub struct ExportFile {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Encoded file content.
    pub bytes: Vec<u8>,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

impl ExportFile {
    /// Encode `frame` as the standard composite download.
    pub fn composite(frame: &FrameRGBA) -> TextBehindResult<Self> {
        Ok(Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime: EXPORT_MIME,
            bytes: encode_png(frame)?,
            width: frame.width,
            height: frame.height,
        })
    }
}

/// Encode `frame` losslessly as PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> TextBehindResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(TextBehindError::encode(format!(
            "frame data is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| TextBehindError::encode("frame buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| TextBehindError::encode(format!("png encode: {e}")))?;
    Ok(buf)
}

/// Encode decoded image pixels (e.g. a cutout) as PNG.
pub fn encode_prepared_png(image: &PreparedImage) -> TextBehindResult<Vec<u8>> {
    encode_png(&FrameRGBA {
        width: image.width,
        height: image.height,
        data: image.rgba8_premul.as_ref().clone(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
