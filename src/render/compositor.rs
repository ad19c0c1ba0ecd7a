//! CPU compositor: background, then text layers, then the foreground cutout.

use std::sync::Arc;

use crate::assets::fonts::FontLibrary;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::layers::model::{ImageLayer, TextLayer};
use crate::render::frame::FrameRGBA;
use crate::transform::geometry::ExportGeometry;

const FALLBACK_TEXT_RGBA: [u8; 4] = [255, 255, 255, 255];

/// Draws a project onto a fixed-size premultiplied RGBA8 buffer.
pub struct Compositor {
    fonts: FontLibrary,
    text_engine: TextLayoutEngine,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor resolving text faces from `fonts`.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            text_engine: TextLayoutEngine::new(),
        }
    }

    /// Font library used for text layers.
    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Render `background`, each of `text_layers` in order, then `foreground` onto a `canvas`
    /// sized buffer. Both images are stretched to fill the buffer.
    #[tracing::instrument(
        skip_all,
        fields(width = canvas.width, height = canvas.height, layers = text_layers.len())
    )]
    pub fn render(
        &mut self,
        background: &ImageLayer,
        text_layers: &[TextLayer],
        foreground: Option<&ImageLayer>,
        canvas: Canvas,
    ) -> TextBehindResult<FrameRGBA> {
        let (width, height) = canvas.size_u16()?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut pixmap = vello_cpu::Pixmap::new(width, height);

        draw_stretched_image(&mut ctx, background, canvas)?;

        let mut warned_no_fonts = false;
        for layer in text_layers {
            self.draw_text_layer(&mut ctx, layer, canvas, &mut warned_no_fonts)?;
        }

        if let Some(fg) = foreground {
            draw_stretched_image(&mut ctx, fg, canvas)?;
        } else {
            tracing::debug!("no foreground cutout; text stays on top");
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_text_layer(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layer: &TextLayer,
        canvas: Canvas,
        warned_no_fonts: &mut bool,
    ) -> TextBehindResult<()> {
        if layer.text.is_empty() {
            return Ok(());
        }

        let units = layer.font_size_units;
        let geometry = ExportGeometry::for_layer(layer, canvas);
        let size_px = geometry.font_size_px as f32;
        // The quadratic term turns large negative sizes positive.
        if units.is_nan() || units <= 0.0 || !size_px.is_finite() || size_px <= 0.0 {
            tracing::debug!(id = %layer.id, size_px, "skipping text layer with unusable font size");
            return Ok(());
        }

        let Some(face) = self.fonts.query(&layer.font_family, layer.font_weight) else {
            if !*warned_no_fonts {
                tracing::warn!("no fonts available; text layers are not drawn");
                *warned_no_fonts = true;
            }
            return Ok(());
        };
        if !face.exact_family {
            tracing::debug!(
                requested = %layer.font_family,
                resolved = %face.family,
                "font family not installed; using fallback face"
            );
        }

        let rgba = layer.color.to_rgba8().unwrap_or_else(|e| {
            tracing::warn!(id = %layer.id, error = %e, "falling back to white text");
            FALLBACK_TEXT_RGBA
        });
        let brush = TextBrushRgba8::from_array(rgba);
        let opacity = clamp_opacity(layer.opacity);

        let shaped =
            self.text_engine
                .layout_plain(&layer.text, &self.fonts, &face, size_px, brush)?;

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(
            geometry.text_box_affine(shaped.width, shaped.height),
        ));
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }

        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&shaped.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }
}

/// Clamp to `[0, 1]`, treating NaN as fully transparent.
pub(crate) fn clamp_opacity(opacity: f64) -> f32 {
    if opacity.is_nan() {
        return 0.0;
    }
    opacity.clamp(0.0, 1.0) as f32
}

fn draw_stretched_image(
    ctx: &mut vello_cpu::RenderContext,
    layer: &ImageLayer,
    canvas: Canvas,
) -> TextBehindResult<()> {
    let img = &layer.image;
    let pixmap = image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let (w, h) = (f64::from(img.width), f64::from(img.height));
    let stretch = Affine::scale_non_uniform(
        f64::from(canvas.width) / w,
        f64::from(canvas.height) / h,
    );

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(stretch));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    Ok(())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> TextBehindResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TextBehindError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TextBehindError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(TextBehindError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
