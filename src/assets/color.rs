use crate::foundation::error::{TextBehindError, TextBehindResult};
use serde::{Deserialize, Serialize};
use vello_cpu::peniko::color::{Srgb, parse_color};

/// A CSS color string kept exactly as the user entered it.
///
/// Accepts anything a browser would: named colors, `#rgb`, `#rrggbbaa`, `rgb()`/`rgba()`,
/// `hsl()`/`hsla()` and friends. Parsing happens at draw time, so an invalid string is stored
/// without complaint and only resolved (with a fallback) when a layer is rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssColor(String);

impl CssColor {
    /// Wrap a CSS color string.
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    /// The color string as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into straight-alpha sRGB `[r, g, b, a]`.
    pub fn to_rgba8(&self) -> TextBehindResult<[u8; 4]> {
        let parsed = parse_color(self.0.trim()).map_err(|e| {
            TextBehindError::validation(format!("invalid css color \"{}\": {e}", self.0))
        })?;
        let c = parsed.to_alpha_color::<Srgb>().to_rgba8();
        Ok([c.r, c.g, c.b, c.a])
    }
}

impl From<&str> for CssColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for CssColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
