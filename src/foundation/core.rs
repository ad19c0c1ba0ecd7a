use crate::foundation::error::{TextBehindError, TextBehindResult};

pub use kurbo::{Affine, Point, Vec2};

/// Largest edge length, in pixels, the CPU rasterizer can address.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;

/// Pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting empty or oversized dimensions.
    pub fn new(width: u32, height: u32) -> TextBehindResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Check that both edges are non-zero and addressable by the rasterizer.
    pub fn validate(self) -> TextBehindResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TextBehindError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.width > MAX_CANVAS_EDGE || self.height > MAX_CANVAS_EDGE {
            return Err(TextBehindError::validation(format!(
                "canvas {}x{} exceeds the {MAX_CANVAS_EDGE}px edge limit",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Geometric center of the canvas in pixel coordinates.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub(crate) fn size_u16(self) -> TextBehindResult<(u16, u16)> {
        self.validate()?;
        // validate() guarantees both edges fit.
        Ok((self.width as u16, self.height as u16))
    }
}
