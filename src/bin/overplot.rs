use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "overplot", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the overlay and composite it over the job's video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render the overlay up to one frame and save that frame as a transparent PNG.
    Frame(FrameArgs),
    /// Print the metadata of a video as JSON (requires `ffprobe`).
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Job JSON file.
    #[arg(long)]
    job: PathBuf,

    /// Override the job's output path.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Job JSON file.
    #[arg(long)]
    job: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Video file.
    #[arg(long)]
    video: PathBuf,

    /// Slow-motion factor applied to the probed duration.
    #[arg(long)]
    slowmo: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut file = overplot::JobFile::from_path(&args.job)?;
    if let Some(out) = args.out {
        file.output_path = std::path::absolute(&out)
            .with_context(|| format!("resolve output path '{}'", out.display()))?;
    }
    let out = file.options().output_path;
    let job = file.into_job()?;
    let stats = job.render_video()?;

    eprintln!(
        "wrote {} ({} frames in {:.1}s)",
        out.display(),
        stats.frames_written,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let job = overplot::JobFile::from_path(&args.job)?.into_job()?;
    let frame = job.render_preview(overplot::FrameIndex(args.frame))?;

    overplot::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_alpha(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let mut meta = overplot::probe_video(&args.video)?;
    if let Some(divisor) = args.slowmo {
        meta = meta.with_slowmo(divisor)?;
    }
    let json = serde_json::to_string_pretty(&meta).context("serialize metadata")?;
    println!("{json}");
    Ok(())
}
