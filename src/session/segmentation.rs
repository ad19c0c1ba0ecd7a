//! Background removal collaborators and the worker that runs them off the session thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};

use anyhow::Context as _;

use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Placeholder replaced by the input image path in a command template.
pub const INPUT_PLACEHOLDER: &str = "{in}";
/// Placeholder replaced by the cutout output path in a command template.
pub const OUTPUT_PLACEHOLDER: &str = "{out}";

#[derive(Clone, Debug)]
/// Encoded upload handed to a [`BackgroundRemover`].
pub struct SourceImage {
    /// Human-readable origin (file path or caller label).
    pub label: String,
    /// Encoded image bytes as uploaded.
    pub bytes: Arc<Vec<u8>>,
    /// On-disk location, when the upload came from a file.
    pub path: Option<PathBuf>,
}

/// Segmentation model boundary: returns the encoded cutout (subject on transparency).
pub trait BackgroundRemover: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;
    /// Produce encoded cutout bytes for `source`.
    fn remove_background(&self, source: &SourceImage) -> TextBehindResult<Vec<u8>>;
}

/// Runs an external program such as `rembg i {in} {out}`.
#[derive(Clone, Debug)]
pub struct CommandRemover {
    program: String,
    args: Vec<String>,
}

impl CommandRemover {
    /// Parse a whitespace separated command template.
    ///
    /// The template must name `{out}`; `{in}` is optional and otherwise the input is fed on
    /// stdin.
    pub fn from_template(template: &str) -> TextBehindResult<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| TextBehindError::validation("segmentation command is empty"))?;
        let args: Vec<String> = parts.collect();
        if !args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            return Err(TextBehindError::validation(format!(
                "segmentation command must contain {OUTPUT_PLACEHOLDER}"
            )));
        }
        Ok(Self { program, args })
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    fn uses_input_path(&self) -> bool {
        self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER))
    }
}

impl BackgroundRemover for CommandRemover {
    fn name(&self) -> &str {
        &self.program
    }

    fn remove_background(&self, source: &SourceImage) -> TextBehindResult<Vec<u8>> {
        let scratch = ScratchDir::create()?;
        let output = scratch.path().join("cutout.png");

        let input = match &source.path {
            Some(p) => p.clone(),
            None => {
                let p = scratch.path().join("input");
                std::fs::write(&p, source.bytes.as_slice())
                    .with_context(|| format!("write segmentation input '{}'", p.display()))?;
                p
            }
        };

        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(self.expand_args(&input, &output))
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped());
        if !self.uses_input_path() {
            cmd.stdin(std::fs::File::open(&input).with_context(|| {
                format!("open segmentation input '{}'", input.display())
            })?);
        }

        tracing::debug!(program = %self.program, input = %input.display(), "spawning background remover");
        let out = cmd.output().map_err(|e| {
            TextBehindError::segmentation(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.program
            ))
        })?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(TextBehindError::segmentation(format!(
                "'{}' exited with {}: {}",
                self.program,
                out.status,
                stderr.trim()
            )));
        }

        std::fs::read(&output).map_err(|e| {
            TextBehindError::segmentation(format!(
                "'{}' produced no cutout at '{}': {e}",
                self.program,
                output.display()
            ))
        })
    }
}

/// Loads a cutout that was computed ahead of time.
#[derive(Clone, Debug)]
pub struct CutoutFileRemover {
    path: PathBuf,
}

impl CutoutFileRemover {
    /// Serve the cutout stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BackgroundRemover for CutoutFileRemover {
    fn name(&self) -> &str {
        "cutout-file"
    }

    fn remove_background(&self, _source: &SourceImage) -> TextBehindResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| {
            TextBehindError::segmentation(format!(
                "read cutout '{}': {e}",
                self.path.display()
            ))
        })
    }
}

#[derive(Clone, Debug)]
/// A segmentation request tagged with the upload generation it belongs to.
pub struct SegmentationTicket {
    /// Session generation captured at upload.
    pub generation: u64,
    /// Image to segment.
    pub source: SourceImage,
}

#[derive(Debug)]
/// Result of one segmentation request.
pub struct SegmentationOutcome {
    /// Generation of the originating ticket.
    pub generation: u64,
    /// Label of the segmented source.
    pub label: String,
    /// Encoded cutout bytes, or the remover's failure.
    pub result: TextBehindResult<Vec<u8>>,
}

impl SegmentationTicket {
    /// Run `remover` on the calling thread.
    pub fn run(&self, remover: &dyn BackgroundRemover) -> SegmentationOutcome {
        let started = std::time::Instant::now();
        let result = remover.remove_background(&self.source);
        tracing::debug!(
            remover = remover.name(),
            generation = self.generation,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "background removal finished"
        );
        SegmentationOutcome {
            generation: self.generation,
            label: self.source.label.clone(),
            result,
        }
    }
}

/// Background thread running removals in submission order.
///
/// Outcomes come back over a channel; the session decides whether they are still current.
pub struct SegmentationWorker {
    jobs: Option<mpsc::Sender<SegmentationTicket>>,
    outcomes: Option<mpsc::Receiver<SegmentationOutcome>>,
    handle: Option<std::thread::JoinHandle<()>>,
    pending: usize,
}

impl std::fmt::Debug for SegmentationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationWorker")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl SegmentationWorker {
    /// Spawn the worker thread around `remover`.
    pub fn spawn(remover: Arc<dyn BackgroundRemover>) -> TextBehindResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<SegmentationTicket>();
        let (out_tx, out_rx) = mpsc::channel::<SegmentationOutcome>();

        let handle = std::thread::Builder::new()
            .name("text-behind-segmentation".to_string())
            .spawn(move || {
                for ticket in job_rx {
                    let outcome = ticket.run(remover.as_ref());
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .context("spawn segmentation worker thread")?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: Some(out_rx),
            handle: Some(handle),
            pending: 0,
        })
    }

    /// Queue `ticket` for removal.
    pub fn submit(&mut self, ticket: SegmentationTicket) -> TextBehindResult<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| TextBehindError::segmentation("segmentation worker is shut down"))?;
        jobs.send(ticket)
            .map_err(|_| TextBehindError::segmentation("segmentation worker has stopped"))?;
        self.pending += 1;
        Ok(())
    }

    /// Requests submitted but not yet received.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Next finished outcome, without blocking.
    pub fn try_recv(&mut self) -> Option<SegmentationOutcome> {
        let outcome = self.outcomes.as_ref()?.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(outcome)
    }

    /// Block until the next outcome. `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<SegmentationOutcome> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.outcomes.as_ref()?.recv().ok()?;
        self.pending -= 1;
        Some(outcome)
    }
}

impl Drop for SegmentationWorker {
    fn drop(&mut self) {
        // Without a receiver the thread exits after the removal in flight.
        self.jobs.take();
        self.outcomes.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("segmentation worker panicked");
        }
    }
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn create() -> TextBehindResult<Self> {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "text-behind-seg-{}-{n}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create scratch dir '{}'", dir.display()))?;
        Ok(Self(dir))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/segmentation.rs"]
mod tests;
