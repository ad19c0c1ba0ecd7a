//! text-behind places styled text *behind* the subject of a photo.
//!
//! The subject is cut out of the uploaded image by an external segmentation model and
//! drawn back on top of user-positioned text layers, so the text appears to pass behind it.
//!
//! # Pipeline overview
//!
//! 1. **Upload**: `Session::upload_path` decodes the photo into the background layer and hands
//!    out a `SegmentationTicket` tagged with the upload generation.
//! 2. **Segment**: a `BackgroundRemover` turns the ticket into cutout bytes, either inline or on a
//!    `SegmentationWorker`; `Session::apply_segmentation` installs it if still current.
//! 3. **Edit**: text layers are added, duplicated, removed and updated one attribute at a time.
//! 4. **Render**: `Compositor::render` draws background, text layers, then the cutout onto a
//!    buffer the size of the background; `PreviewScene` describes the same result as HTML.
//! 5. **Export**: the frame is encoded as `text-behind-image.png` and delivered to a
//!    `DownloadSink`.
//!
//! Placement is resolution independent: layers store percent offsets from the image center and a
//! size relative to [`BASE_FONT_SIZE`]; the transform engine turns them into pixels for whichever
//! surface is being drawn.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Premultiplied RGBA8** end-to-end; frames are converted to straight alpha only for PNG.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod export;
mod foundation;
mod layers;
mod render;
mod session;

/// Editor configuration loaded from JSON.
pub mod config;
/// Preview and export geometry of text layers.
pub mod transform;

pub use assets::color::CssColor;
pub use assets::decode::{
    PreparedImage, UPLOAD_EXTENSIONS, decode_image, is_supported_upload, read_upload,
};
pub use assets::fonts::{FONT_EXTENSIONS, FaceMatch, FontLibrary};
pub use assets::text::{ShapedText, TextBrushRgba8, TextLayoutEngine};
pub use config::EditorConfig;
pub use export::png::{
    EXPORT_FILE_NAME, EXPORT_MIME, ExportFile, encode_png, encode_prepared_png,
};
pub use export::sink::{
    DirectorySink, DownloadSink, InMemoryDownloads, ensure_parent_dir, trigger_download,
};
pub use foundation::core::{Affine, Canvas, MAX_CANVAS_EDGE, Point, Vec2};
pub use foundation::error::{TextBehindError, TextBehindResult};
pub use layers::model::{BASE_FONT_SIZE, ImageLayer, LayerId, Project, TextAttr, TextLayer};
pub use layers::ops::{
    add_text_layer, create_text_layer, duplicate_text_layer, next_layer_id, remove_text_layer,
    update_attribute,
};
pub use render::compositor::Compositor;
pub use render::frame::FrameRGBA;
pub use render::preview::{ImageRole, PreviewElement, PreviewScene, PreviewTextStyle};
pub use session::editor::{SegmentationApplied, Session};
pub use session::segmentation::{
    BackgroundRemover, CommandRemover, CutoutFileRemover, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER,
    SegmentationOutcome, SegmentationTicket, SegmentationWorker, SourceImage,
};
pub use transform::{
    ExportGeometry, PreviewGeometry, anchor_px, export_font_size_px, font_scale,
    preview_font_size_percent,
};
