use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "text-behind", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite text behind the subject and write `text-behind-image.png`.
    Compose(ComposeArgs),
    /// Write the live-preview HTML fragment for a session.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Uploaded photo (.jpg, .jpeg or .png).
    #[arg(long)]
    image: PathBuf,

    /// JSON array of text layers; each entry maps attribute keys (e.g. `fontSizeUnits`) to values.
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Precomputed cutout image to use as the foreground.
    #[arg(long, conflicts_with = "segment_cmd")]
    cutout: Option<PathBuf>,

    /// Background remover command template with `{in}`/`{out}` placeholders.
    #[arg(long)]
    segment_cmd: Option<String>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not load the host's installed fonts.
    #[arg(long)]
    no_system_fonts: bool,

    /// Print diagnostics about text font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output directory (defaults to the config's `output_dir`).
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output HTML path. The cutout is written next to it as `<stem>-cutout.png`.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn init_logging(filter: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(args: &SessionArgs) -> anyhow::Result<text_behind::EditorConfig> {
    let mut cfg = match &args.config {
        Some(path) => text_behind::EditorConfig::from_path(path)?,
        None => text_behind::EditorConfig::default(),
    };
    cfg.font_dirs.extend(args.font_dirs.iter().cloned());
    if args.no_system_fonts {
        cfg.system_fonts = false;
    }
    if let Some(cmd) = &args.segment_cmd {
        cfg.segmentation_command = Some(cmd.clone());
    }
    cfg.validate()?;
    Ok(cfg)
}

type LayerEntry = serde_json::Map<String, serde_json::Value>;

fn read_layers_json(path: &Path) -> anyhow::Result<Vec<LayerEntry>> {
    let f = File::open(path).with_context(|| format!("open layers '{}'", path.display()))?;
    let r = BufReader::new(f);
    let layers: Vec<LayerEntry> = serde_json::from_reader(r)
        .with_context(|| "parse layers JSON (expected an array of objects)")?;
    Ok(layers)
}

fn build_session(
    args: &SessionArgs,
    cfg: &text_behind::EditorConfig,
) -> anyhow::Result<text_behind::Session> {
    let mut session = text_behind::Session::new(cfg.font_library());
    let ticket = session.upload_path(&args.image)?;

    let remover: Option<Arc<dyn text_behind::BackgroundRemover>> = match &args.cutout {
        Some(path) => Some(Arc::new(text_behind::CutoutFileRemover::new(path))),
        None => cfg.remover()?,
    };

    match remover {
        Some(remover) => {
            let mut worker = text_behind::SegmentationWorker::spawn(remover)?;
            worker.submit(ticket)?;
            let outcome = worker
                .wait()
                .context("segmentation worker stopped without a result")?;
            let applied = session.apply_segmentation(outcome);
            tracing::info!(?applied, "segmentation finished");
        }
        None => {
            tracing::info!("no background remover configured; text will stay in front");
            session.skip_segmentation();
        }
    }

    if let Some(path) = &args.layers {
        for (i, entry) in read_layers_json(path)?.into_iter().enumerate() {
            let id = session.add_new_text_set();
            for (key, value) in entry {
                session
                    .handle_attribute_change_json(id, &key, value)
                    .with_context(|| format!("layer {i}"))?;
            }
        }
    }

    if args.dump_fonts {
        dump_font_diagnostics(&session)?;
    }

    Ok(session)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    init_logging(&cfg.log_filter);

    let mut session = build_session(&args.session, &cfg)?;
    let out_dir = args.out_dir.unwrap_or_else(|| cfg.output_dir.clone());
    let mut sink = text_behind::DirectorySink::new(out_dir);

    let file = session
        .save_composite_image(&mut sink)?
        .context("nothing to export (image setup did not finish)")?;

    let written = sink
        .last_path()
        .map(|p| p.display().to_string())
        .unwrap_or(file.file_name);
    eprintln!("wrote {written} ({}x{})", file.width, file.height);
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    init_logging(&cfg.log_filter);

    let session = build_session(&args.session, &cfg)?;
    let mut scene = session.preview().context("no background uploaded")?;

    // Image sources are written next to the HTML file and referenced by file name.
    let stem = args
        .out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("preview");
    text_behind::ensure_parent_dir(&args.out)?;

    let ext = args
        .session
        .image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();
    let background_name = format!("{stem}-background.{ext}");
    let background_path = args.out.with_file_name(&background_name);
    std::fs::copy(&args.session.image, &background_path)
        .with_context(|| format!("copy background to '{}'", background_path.display()))?;
    scene.set_image_source(text_behind::ImageRole::Background, background_name);

    if let Some(fg) = &session.project().foreground {
        let cutout_name = format!("{stem}-cutout.png");
        let cutout_path = args.out.with_file_name(&cutout_name);
        std::fs::write(&cutout_path, text_behind::encode_prepared_png(&fg.image)?)
            .with_context(|| format!("write cutout '{}'", cutout_path.display()))?;
        scene.set_image_source(text_behind::ImageRole::Foreground, cutout_name);
    }

    std::fs::write(&args.out, scene.to_html())
        .with_context(|| format!("write preview '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn dump_font_diagnostics(session: &text_behind::Session) -> anyhow::Result<()> {
    eprintln!("text font diagnostics:");
    eprintln!("  faces: {}", session.fonts().face_count());
    for layer in session.text_layers() {
        eprintln!("  layer {}:", layer.id);
        eprintln!("    requested:   {} {}", layer.font_family, layer.font_weight);
        let Some(face) = session.fonts().query(&layer.font_family, layer.font_weight) else {
            eprintln!("    resolved:    <none>");
            continue;
        };
        let (bytes, _) = session
            .fonts()
            .face_bytes(face.id)
            .with_context(|| format!("load font bytes for '{}'", face.family))?;
        eprintln!("    family:      {} {}", face.family, face.weight);
        eprintln!("    sha256:      {}", sha256_hex(&bytes));
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
