//! Editor configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::fonts::FontLibrary;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::session::segmentation::{BackgroundRemover, CommandRemover};

/// Settings shared by every session started from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,

    /// Whether to load the fonts installed on the host.
    pub system_fonts: bool,

    /// Directory the exported PNG is written to.
    pub output_dir: PathBuf,

    /// Background remover command, e.g. `rembg i {in} {out}`.
    pub segmentation_command: Option<String>,

    /// Default log filter when `RUST_LOG` is unset (e.g. "info", "text_behind=debug").
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_dirs: Vec::new(),
            system_fonts: true,
            output_dir: PathBuf::from("."),
            segmentation_command: None,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> TextBehindResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|e| {
            TextBehindError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> TextBehindResult<()> {
        if self.log_filter.trim().is_empty() {
            return Err(TextBehindError::validation("log_filter must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(TextBehindError::validation("output_dir must not be empty"));
        }
        if let Some(cmd) = &self.segmentation_command {
            CommandRemover::from_template(cmd)?;
        }
        Ok(())
    }

    /// Build the font library described by this config.
    pub fn font_library(&self) -> FontLibrary {
        let mut lib = if self.system_fonts {
            FontLibrary::with_system_fonts()
        } else {
            FontLibrary::empty()
        };
        for dir in &self.font_dirs {
            lib.load_dir(dir);
        }
        tracing::debug!(faces = lib.face_count(), "font library ready");
        lib
    }

    /// The configured command remover, if any.
    pub fn remover(&self) -> TextBehindResult<Option<Arc<dyn BackgroundRemover>>> {
        let Some(cmd) = &self.segmentation_command else {
            return Ok(None);
        };
        let remover: Arc<dyn BackgroundRemover> = Arc::new(CommandRemover::from_template(cmd)?);
        Ok(Some(remover))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
