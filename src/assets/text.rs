use std::collections::HashMap;

use usvg::fontdb;

use crate::assets::fonts::{FaceMatch, FontLibrary};
use crate::foundation::error::{TextBehindError, TextBehindResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Brush from straight (non-premultiplied) channels.
    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Single-line text shaped with one resolved face.
pub struct ShapedText {
    /// Parley layout with glyph positions relative to the layout box origin.
    pub layout: parley::Layout<TextBrushRgba8>,
    /// Face used to rasterize the glyph runs.
    pub font: vello_cpu::peniko::FontData,
    /// Layout box width in pixels.
    pub width: f64,
    /// Layout box height in pixels.
    pub height: f64,
}

impl std::fmt::Debug for ShapedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedText")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

struct RegisteredFace {
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Stateful helper that registers library faces with Parley and lays out text.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    faces: HashMap<fontdb::ID, RegisteredFace>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Number of faces registered with Parley so far.
    pub fn registered_faces(&self) -> usize {
        self.faces.len()
    }

    /// Shape `text` with the face in `face` at `size_px`, without line wrapping.
    pub fn layout_plain(
        &mut self,
        text: &str,
        library: &FontLibrary,
        face: &FaceMatch,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> TextBehindResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TextBehindError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let (family_name, font) = {
            let registered = self.register(library, face)?;
            (registered.family_name.clone(), registered.font.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        // Request the face's own weight so Parley picks the same face we rasterize with.
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let width = f64::from(layout.width());
        let height = f64::from(layout.height());
        Ok(ShapedText {
            layout,
            font,
            width,
            height,
        })
    }

    fn register(
        &mut self,
        library: &FontLibrary,
        face: &FaceMatch,
    ) -> TextBehindResult<&RegisteredFace> {
        if !self.faces.contains_key(&face.id) {
            let (bytes, index) = library.face_bytes(face.id).ok_or_else(|| {
                TextBehindError::render(format!("font face for '{}' has no data", face.family))
            })?;

            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
            let mut names = Vec::with_capacity(families.len());
            for (id, _) in &families {
                if let Some(name) = self.font_ctx.collection.family_name(*id) {
                    names.push(name.to_string());
                }
            }
            let family_name = names
                .iter()
                .find(|n| n.eq_ignore_ascii_case(&face.family))
                .or_else(|| names.first())
                .cloned()
                .ok_or_else(|| {
                    TextBehindError::render("no font families registered from font bytes")
                })?;

            tracing::debug!(family = %family_name, weight = face.weight, "registered face for shaping");
            let font =
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index);
            self.faces
                .insert(face.id, RegisteredFace { family_name, font });
        }

        self.faces
            .get(&face.id)
            .ok_or_else(|| TextBehindError::render("font face registration was lost"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
