use crate::assets::color::CssColor;
use crate::assets::decode::PreparedImage;
use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Reference font size that `fontSizeUnits` is measured against.
pub const BASE_FONT_SIZE: f64 = 200.0;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
/// Project-unique identifier of a text layer.
pub struct LayerId(pub u32);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// One placed piece of text.
///
/// Placement is resolution independent: `top`/`left` are percentage offsets from the image
/// center and `font_size_units` is relative to [`BASE_FONT_SIZE`].
pub struct TextLayer {
    /// Identifier, unique within the project.
    pub id: LayerId,
    /// Displayed text. May be empty.
    pub text: String,
    /// Requested font family.
    pub font_family: String,
    /// Size in [`BASE_FONT_SIZE`] units.
    pub font_size_units: f64,
    /// Font weight (100-900).
    #[serde(deserialize_with = "deserialize_font_weight")]
    pub font_weight: u16,
    /// Fill color, parsed at draw time.
    pub color: CssColor,
    /// Global opacity, nominally in [0, 1].
    pub opacity: f64,
    /// Vertical offset from center in percent; positive moves up.
    pub top: f64,
    /// Horizontal offset from center in percent; positive moves right.
    pub left: f64,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Drop shadow color. Kept in the model, not drawn by export.
    pub shadow_color: CssColor,
    /// Drop shadow blur size. Kept in the model, not drawn by export.
    pub shadow_size: f64,
}

impl TextLayer {
    /// Layer with the editor defaults and the given id.
    pub fn with_defaults(id: LayerId) -> Self {
        Self {
            id,
            text: "edit".to_string(),
            font_family: "Inter".to_string(),
            font_size_units: BASE_FONT_SIZE,
            font_weight: 800,
            color: CssColor::new("white"),
            opacity: 1.0,
            top: 0.0,
            left: 0.0,
            rotation: 0.0,
            shadow_color: CssColor::new("rgba(0, 0, 0, 0.8)"),
            shadow_size: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    tag = "key",
    content = "value",
    rename_all = "camelCase",
    deny_unknown_fields
)]
/// A single typed text layer attribute update.
///
/// The JSON shape is `{"key": "fontSizeUnits", "value": 320}`.
pub enum TextAttr {
    /// Replace `text`.
    Text(String),
    /// Replace `font_family`.
    FontFamily(String),
    /// Replace `font_size_units`.
    FontSizeUnits(f64),
    /// Replace `font_weight`.
    #[serde(deserialize_with = "deserialize_font_weight")]
    FontWeight(u16),
    /// Replace `color`.
    Color(CssColor),
    /// Replace `opacity`.
    Opacity(f64),
    /// Replace `top`.
    Top(f64),
    /// Replace `left`.
    Left(f64),
    /// Replace `rotation`.
    Rotation(f64),
    /// Replace `shadow_color`.
    ShadowColor(CssColor),
    /// Replace `shadow_size`.
    ShadowSize(f64),
}

impl TextAttr {
    /// Every key accepted by [`TextAttr::from_key_value`].
    pub const KEYS: &'static [&'static str] = &[
        "text",
        "fontFamily",
        "fontSizeUnits",
        "fontWeight",
        "color",
        "opacity",
        "top",
        "left",
        "rotation",
        "shadowColor",
        "shadowSize",
    ];

    /// Parse an untyped `(key, value)` pair coming from a UI control.
    ///
    /// Unknown keys and values of the wrong type are rejected.
    pub fn from_key_value(key: &str, value: serde_json::Value) -> TextBehindResult<Self> {
        if !Self::KEYS.contains(&key) {
            return Err(TextBehindError::validation(format!(
                "unknown text attribute '{key}'"
            )));
        }
        let tagged = serde_json::json!({ "key": key, "value": value });
        serde_json::from_value(tagged).map_err(|e| {
            TextBehindError::validation(format!("invalid value for text attribute '{key}': {e}"))
        })
    }

    /// Wire name of the attribute.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::FontFamily(_) => "fontFamily",
            Self::FontSizeUnits(_) => "fontSizeUnits",
            Self::FontWeight(_) => "fontWeight",
            Self::Color(_) => "color",
            Self::Opacity(_) => "opacity",
            Self::Top(_) => "top",
            Self::Left(_) => "left",
            Self::Rotation(_) => "rotation",
            Self::ShadowColor(_) => "shadowColor",
            Self::ShadowSize(_) => "shadowSize",
        }
    }

    /// Write the attribute into `layer`.
    pub fn apply_to(&self, layer: &mut TextLayer) {
        match self {
            Self::Text(v) => layer.text.clone_from(v),
            Self::FontFamily(v) => layer.font_family.clone_from(v),
            Self::FontSizeUnits(v) => layer.font_size_units = *v,
            Self::FontWeight(v) => layer.font_weight = *v,
            Self::Color(v) => layer.color = v.clone(),
            Self::Opacity(v) => layer.opacity = *v,
            Self::Top(v) => layer.top = *v,
            Self::Left(v) => layer.left = *v,
            Self::Rotation(v) => layer.rotation = *v,
            Self::ShadowColor(v) => layer.shadow_color = v.clone(),
            Self::ShadowSize(v) => layer.shadow_size = *v,
        }
    }
}

/// Accepts whole numbers written as integers or floats (`800` and `800.0`).
fn deserialize_font_weight<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    let value = <f64 as serde::Deserialize>::deserialize(deserializer)?;
    if value.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&value) {
        return Err(D::Error::custom(format!(
            "font weight must be a whole number in 0..=65535, got {value}"
        )));
    }
    Ok(value as u16)
}

#[derive(Clone, Debug)]
/// Background or foreground image with its decoded pixels.
pub struct ImageLayer {
    /// Where the pixels came from (file path or caller-supplied label).
    pub source: String,
    /// Decoded premultiplied pixels.
    pub image: PreparedImage,
}

impl ImageLayer {
    /// Wrap decoded pixels.
    pub fn new(source: impl Into<String>, image: PreparedImage) -> Self {
        Self {
            source: source.into(),
            image,
        }
    }

    /// Width of the decoded source in pixels.
    pub fn natural_width(&self) -> u32 {
        self.image.width
    }

    /// Height of the decoded source in pixels.
    pub fn natural_height(&self) -> u32 {
        self.image.height
    }
}

#[derive(Clone, Debug, Default)]
/// Everything one editing session composes: background, cutout and text layers.
pub struct Project {
    /// Uploaded image, stretched to fill the output.
    pub background: Option<ImageLayer>,
    /// Segmented subject drawn over all text. Absent while pending or after failure.
    pub foreground: Option<ImageLayer>,
    /// Text layers in z-order, first drawn first.
    pub text_layers: Vec<TextLayer>,
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
