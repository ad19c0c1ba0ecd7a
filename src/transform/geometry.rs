//! Placement of text layers on preview and export surfaces.
//!
//! Both surfaces derive from the same normalized layer attributes, so the visual center of a
//! layer lands on the same relative point of the image regardless of surface size.

use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::layers::model::{BASE_FONT_SIZE, TextLayer};

/// Percent font size at `scale == 1` on the preview surface.
pub const PREVIEW_FONT_PERCENT_PER_SCALE: f64 = 800.0;
/// Linear pixel term of the export font size.
pub const EXPORT_FONT_LINEAR_PX: f64 = 1600.0;
/// Quadratic pixel term of the export font size.
pub const EXPORT_FONT_QUADRATIC_PX: f64 = 340.0;

/// `font_size_units / BASE_FONT_SIZE`.
#[inline]
pub fn font_scale(font_size_units: f64) -> f64 {
    font_size_units / BASE_FONT_SIZE
}

/// Font size on the preview surface, in percent of the container font size.
#[inline]
pub fn preview_font_size_percent(font_size_units: f64) -> f64 {
    font_scale(font_size_units) * PREVIEW_FONT_PERCENT_PER_SCALE
}

/// Font size on the export surface, in pixels.
#[inline]
pub fn export_font_size_px(font_size_units: f64) -> f64 {
    let scale = font_scale(font_size_units);
    scale * EXPORT_FONT_LINEAR_PX + scale * scale * EXPORT_FONT_QUADRATIC_PX
}

/// Absolute anchor on a `canvas`-sized surface for center-relative percent offsets.
#[inline]
pub fn anchor_px(canvas: Canvas, top: f64, left: f64) -> Point {
    Point::new(
        f64::from(canvas.width) * (left + 50.0) / 100.0,
        f64::from(canvas.height) * (50.0 - top) / 100.0,
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Text placement on a fixed-resolution raster.
pub struct ExportGeometry {
    /// Point the text box center is placed on.
    pub anchor: Point,
    /// Clockwise rotation around `anchor`, in radians.
    pub rotation_rad: f64,
    /// Font size in pixels.
    pub font_size_px: f64,
}

impl ExportGeometry {
    /// Geometry of `layer` on a `canvas`-sized raster.
    pub fn for_layer(layer: &TextLayer, canvas: Canvas) -> Self {
        Self {
            anchor: anchor_px(canvas, layer.top, layer.left),
            rotation_rad: layer.rotation.to_radians(),
            font_size_px: export_font_size_px(layer.font_size_units),
        }
    }

    /// Translate to the anchor, then rotate.
    ///
    /// In the y-down raster space a positive angle turns clockwise on screen.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.anchor.to_vec2()) * Affine::rotate(self.rotation_rad)
    }

    /// [`Self::to_affine`] applied to a `width` x `height` box whose origin is its top-left.
    pub fn text_box_affine(&self, width: f64, height: f64) -> Affine {
        self.to_affine() * Affine::translate(Vec2::new(-width / 2.0, -height / 2.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Text placement on the live preview, expressed as CSS values.
pub struct PreviewGeometry {
    /// CSS `top` in percent of the container.
    pub top_percent: f64,
    /// CSS `left` in percent of the container.
    pub left_percent: f64,
    /// CSS `font-size` in percent.
    pub font_size_percent: f64,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
}

impl PreviewGeometry {
    /// Preview geometry of `layer`.
    pub fn for_layer(layer: &TextLayer) -> Self {
        Self {
            top_percent: 50.0 - layer.top,
            left_percent: layer.left + 50.0,
            font_size_percent: preview_font_size_percent(layer.font_size_units),
            rotation_deg: layer.rotation,
        }
    }

    /// The CSS `transform` that centers the element on its anchor and rotates it.
    pub fn css_transform(&self) -> String {
        format!("translate(-50%, -50%) rotate({}deg)", self.rotation_deg)
    }

    /// Where the element's center lands in a `width` x `height` container.
    pub fn anchor_in(&self, width: f64, height: f64) -> Point {
        Point::new(
            width * self.left_percent / 100.0,
            height * self.top_percent / 100.0,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/geometry.rs"]
mod tests;
