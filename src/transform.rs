//! Text layer geometry shared by the preview and the raster export.

pub(crate) mod geometry;

pub use geometry::{
    EXPORT_FONT_LINEAR_PX, EXPORT_FONT_QUADRATIC_PX, ExportGeometry,
    PREVIEW_FONT_PERCENT_PER_SCALE, PreviewGeometry, anchor_px, export_font_size_px, font_scale,
    preview_font_size_percent,
};
