use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::export::png::ExportFile;
use crate::foundation::error::TextBehindResult;

/// Destination for exported files.
pub trait DownloadSink {
    /// Take ownership of `file`.
    fn deliver(&mut self, file: &ExportFile) -> TextBehindResult<()>;
}

/// Hand `file` to `sink`, logging the delivery.
pub fn trigger_download(sink: &mut dyn DownloadSink, file: &ExportFile) -> TextBehindResult<()> {
    sink.deliver(file)?;
    tracing::info!(
        file = %file.file_name,
        mime = file.mime,
        bytes = file.bytes.len(),
        "export delivered"
    );
    Ok(())
}

/// Writes files into a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: None,
        }
    }

    /// Path of the most recently written file.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file: &ExportFile) -> TextBehindResult<()> {
        let path = self.dir.join(&file.file_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.last_path = Some(path);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryDownloads {
    files: Vec<ExportFile>,
}

impl InMemoryDownloads {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the delivered files, oldest first.
    pub fn files(&self) -> &[ExportFile] {
        &self.files
    }
}

impl DownloadSink for InMemoryDownloads {
    fn deliver(&mut self, file: &ExportFile) -> TextBehindResult<()> {
        self.files.push(file.clone());
        Ok(())
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> TextBehindResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
