use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aftermovie", version)]
struct Cli {
    /// Log filter level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the whole aftermovie (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render one preview frame of an item as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render manifest JSON (`items`, `options`, optional `audio`).
    #[arg(long)]
    manifest: PathBuf,

    /// Output directory; the file name is derived from the title and today's date.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Render manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Item index (0-based).
    #[arg(long, default_value_t = 0)]
    item: usize,

    /// Position inside the item's slot, in `[0, 1]`.
    #[arg(long, default_value_t = 0.5)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(serde::Deserialize, Debug)]
struct Manifest {
    items: Vec<aftermovie::MediaItem>,
    #[serde(default)]
    options: aftermovie::RenderOptions,
    #[serde(default)]
    audio: Option<aftermovie::AudioOptions>,
}

impl Manifest {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse manifest '{}'", path.display()))?;
        let root = assets_root(path);
        if let Some(audio) = manifest.audio.as_mut()
            && audio.path.is_relative()
        {
            audio.path = root.join(&audio.path);
        }
        Ok(manifest)
    }
}

fn assets_root(manifest: &Path) -> &Path {
    manifest.parent().unwrap_or_else(|| Path::new("."))
}

fn loader_for(
    manifest: &Path,
    opts: &aftermovie::RenderOptions,
) -> Arc<dyn aftermovie::MediaLoader> {
    Arc::new(
        aftermovie::FsMediaLoader::new(assets_root(manifest))
            .with_max_dimension(opts.width.max(opts.height) * 3 / 2),
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log)
        .with_writer(std::io::stderr)
        .init();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let manifest = Manifest::from_path(&args.manifest)?;
    let loader = loader_for(&args.manifest, &manifest.options);
    let movie = aftermovie::AftermovieSession::new(manifest.options)
        .with_loader(loader)
        .with_audio(manifest.audio)
        .on_progress(Box::new(|p: aftermovie::RenderProgress| {
            tracing::info!(stage = ?p.stage, "{}/{} {}", p.processed, p.total, p.message);
        }))
        .run(&manifest.items)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let out = args.out.join(&movie.file_name);
    std::fs::write(&out, &movie.data).with_context(|| format!("write '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({}, {:.2}s, {} frames)",
        out.display(),
        movie.mime_type,
        movie.duration_secs,
        movie.frames
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let manifest = Manifest::from_path(&args.manifest)?;
    let loader = loader_for(&args.manifest, &manifest.options);
    let frame = aftermovie::AftermovieSession::new(manifest.options)
        .with_loader(loader)
        .preview(&manifest.items, args.item, args.at)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut rgba = frame.data;
    if frame.premultiplied {
        unpremultiply_in_place(&mut rgba);
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
