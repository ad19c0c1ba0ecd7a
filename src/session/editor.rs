//! The editing session: one project, one upload generation, one compositor.

use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{decode_image, read_upload};
use crate::assets::fonts::FontLibrary;
use crate::export::png::ExportFile;
use crate::export::sink::{DownloadSink, trigger_download};
use crate::foundation::core::Canvas;
use crate::foundation::error::TextBehindResult;
use crate::layers::model::{ImageLayer, LayerId, Project, TextAttr, TextLayer};
use crate::layers::ops;
use crate::render::compositor::Compositor;
use crate::render::frame::FrameRGBA;
use crate::render::preview::PreviewScene;
use crate::session::segmentation::{
    BackgroundRemover, SegmentationOutcome, SegmentationTicket, SourceImage,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What [`Session::apply_segmentation`] did with an outcome.
pub enum SegmentationApplied {
    /// The cutout became the foreground layer.
    Applied,
    /// Removal or cutout decoding failed; the project continues without a foreground.
    Failed,
    /// The outcome belongs to an earlier upload and was dropped.
    Stale,
}

/// Owned editor state for a single image.
pub struct Session {
    generation: u64,
    project: Project,
    setup_done: bool,
    compositor: Compositor,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("setup_done", &self.setup_done)
            .field("text_layers", &self.project.text_layers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Empty session drawing text with `fonts`.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            generation: 0,
            project: Project::default(),
            setup_done: false,
            compositor: Compositor::new(fonts),
        }
    }

    /// Number of uploads accepted so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current project.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Text layers in draw order.
    pub fn text_layers(&self) -> &[TextLayer] {
        &self.project.text_layers
    }

    /// Layer with `id`, if present.
    pub fn text_layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.project.text_layers.iter().find(|l| l.id == id)
    }

    /// Whether segmentation has finished (successfully or not) for the current upload.
    pub fn is_image_setup_done(&self) -> bool {
        self.setup_done
    }

    /// Fonts available to text layers.
    pub fn fonts(&self) -> &FontLibrary {
        self.compositor.fonts()
    }

    /// Read and decode an upload from disk. See [`Session::upload_bytes`].
    pub fn upload_path(&mut self, path: &Path) -> TextBehindResult<SegmentationTicket> {
        let bytes = read_upload(path)?;
        self.accept_upload(path.display().to_string(), bytes, Some(path.to_path_buf()))
    }

    /// Decode `bytes` as the new background and start a fresh project.
    ///
    /// The returned ticket carries the new generation; hand it to a [`BackgroundRemover`] and
    /// feed the outcome back through [`Session::apply_segmentation`]. A decode failure leaves the
    /// session untouched.
    pub fn upload_bytes(
        &mut self,
        label: impl Into<String>,
        bytes: Vec<u8>,
    ) -> TextBehindResult<SegmentationTicket> {
        self.accept_upload(label.into(), bytes, None)
    }

    #[tracing::instrument(skip(self, bytes, path), fields(len = bytes.len()))]
    fn accept_upload(
        &mut self,
        label: String,
        bytes: Vec<u8>,
        path: Option<std::path::PathBuf>,
    ) -> TextBehindResult<SegmentationTicket> {
        let image = decode_image(&bytes)?;
        tracing::info!(width = image.width, height = image.height, "background decoded");

        self.generation += 1;
        self.setup_done = false;
        self.project = Project {
            background: Some(ImageLayer::new(label.clone(), image)),
            foreground: None,
            text_layers: Vec::new(),
        };

        Ok(SegmentationTicket {
            generation: self.generation,
            source: SourceImage {
                label,
                bytes: Arc::new(bytes),
                path,
            },
        })
    }

    /// Install a segmentation outcome if it belongs to the current upload.
    #[tracing::instrument(skip(self, outcome), fields(generation = outcome.generation))]
    pub fn apply_segmentation(&mut self, outcome: SegmentationOutcome) -> SegmentationApplied {
        if outcome.generation != self.generation {
            tracing::debug!(current = self.generation, "discarding stale segmentation result");
            return SegmentationApplied::Stale;
        }

        let applied = match outcome.result.and_then(|bytes| decode_image(&bytes)) {
            Ok(cutout) => {
                self.project.foreground =
                    Some(ImageLayer::new(format!("cutout:{}", outcome.label), cutout));
                SegmentationApplied::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "background removal failed; continuing without cutout");
                self.project.foreground = None;
                SegmentationApplied::Failed
            }
        };
        self.setup_done = true;
        applied
    }

    /// Finish setup without a cutout; text is drawn over the whole image.
    pub fn skip_segmentation(&mut self) {
        if self.project.background.is_some() {
            self.setup_done = true;
        }
    }

    /// Run `remover` for `ticket` on this thread and apply the result.
    pub fn segment_blocking(
        &mut self,
        ticket: &SegmentationTicket,
        remover: &dyn BackgroundRemover,
    ) -> SegmentationApplied {
        self.apply_segmentation(ticket.run(remover))
    }

    /// Append a default text layer and return its id.
    pub fn add_new_text_set(&mut self) -> LayerId {
        let layers = std::mem::take(&mut self.project.text_layers);
        self.project.text_layers = ops::add_text_layer(layers);
        self.last_layer_id()
    }

    /// Append a copy of layer `id`. `None` if there is no such layer.
    pub fn duplicate_text_set(&mut self, id: LayerId) -> Option<LayerId> {
        let source = self.text_layer(id)?.clone();
        let layers = std::mem::take(&mut self.project.text_layers);
        self.project.text_layers = ops::duplicate_text_layer(layers, &source);
        Some(self.last_layer_id())
    }

    /// Remove layer `id`.
    pub fn remove_text_set(&mut self, id: LayerId) {
        let layers = std::mem::take(&mut self.project.text_layers);
        self.project.text_layers = ops::remove_text_layer(layers, id);
    }

    /// Set one attribute on layer `id`. Missing ids are ignored.
    pub fn handle_attribute_change(&mut self, id: LayerId, attr: &TextAttr) {
        let layers = std::mem::take(&mut self.project.text_layers);
        self.project.text_layers = ops::update_attribute(layers, id, attr);
    }

    /// [`Session::handle_attribute_change`] for an untyped `(key, value)` pair.
    pub fn handle_attribute_change_json(
        &mut self,
        id: LayerId,
        key: &str,
        value: serde_json::Value,
    ) -> TextBehindResult<()> {
        let attr = TextAttr::from_key_value(key, value)?;
        self.handle_attribute_change(id, &attr);
        Ok(())
    }

    /// Composite at the background's natural size.
    ///
    /// `None` while there is no background or setup is still pending.
    pub fn render_export(&mut self) -> TextBehindResult<Option<FrameRGBA>> {
        if !self.setup_done {
            tracing::debug!("export skipped: image setup not done");
            return Ok(None);
        }
        let Some(background) = &self.project.background else {
            tracing::debug!("export skipped: no background");
            return Ok(None);
        };

        let canvas = Canvas::new(background.natural_width(), background.natural_height())?;
        let frame = self.compositor.render(
            background,
            &self.project.text_layers,
            self.project.foreground.as_ref(),
            canvas,
        )?;
        Ok(Some(frame))
    }

    /// Render, encode and deliver `text-behind-image.png` to `sink`.
    pub fn save_composite_image(
        &mut self,
        sink: &mut dyn DownloadSink,
    ) -> TextBehindResult<Option<ExportFile>> {
        let Some(frame) = self.render_export()? else {
            return Ok(None);
        };
        let file = ExportFile::composite(&frame)?;
        trigger_download(sink, &file)?;
        Ok(Some(file))
    }

    /// Declarative preview of the current project.
    pub fn preview(&self) -> Option<PreviewScene> {
        PreviewScene::build(&self.project, self.setup_done)
    }

    fn last_layer_id(&self) -> LayerId {
        self.project
            .text_layers
            .last()
            .map(|l| l.id)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
