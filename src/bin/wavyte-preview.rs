use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use wavyte_preview::{
    ClockOpts, EngineConfig, OutcomeKind, PlaybackClock, PlaybackEngine, RenderGate,
    RenderOutcome, Renderer, RendererConfig, SyntheticFactory, SyntheticOpts, Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "wavyte-preview", version)]
struct Cli {
    /// Log renderer decisions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame at a timestamp as a PNG.
    Frame(FrameArgs),
    /// Drive a render gate and a playback engine from a fixed-rate clock and print a JSON report.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timestamp in milliseconds.
    #[arg(long)]
    at: i64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Preview settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playback start in milliseconds.
    #[arg(long, default_value_t = 0)]
    from: i64,

    /// Number of clock ticks.
    #[arg(long, default_value_t = 90)]
    ticks: u64,

    /// Clock worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Preview settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Everything the CLI reads from `--config`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PreviewSettings {
    renderer: RendererConfig,
    engine: EngineConfig,
    synthetic: SyntheticOpts,
}

impl PreviewSettings {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let f = std::fs::File::open(path)
            .with_context(|| format!("open settings '{}'", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(f))
            .with_context(|| format!("parse settings '{}'", path.display()))
    }
}

#[derive(Debug, serde::Serialize)]
struct PlayReport {
    clock: wavyte_preview::ClockReport,
    gate: wavyte_preview::GateStats,
    renderer: wavyte_preview::RendererStats,
    engine: wavyte_preview::EngineStats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let timeline = Arc::new(Timeline::from_path(&args.in_path)?);
    let settings = PreviewSettings::load(args.config.as_deref())?;
    let factory = SyntheticFactory::new(settings.synthetic);
    let mut renderer = Renderer::new(timeline, settings.renderer, &factory)?;

    // A far seek may answer with placeholders; keep asking one interval later.
    let interval_ms = renderer.frame_interval_ms().ceil() as i64;
    let mut ts = args.at;
    let frame = loop {
        match renderer.render(ts) {
            RenderOutcome::Success(frame) => break frame,
            RenderOutcome::Fallback(_) => {
                tracing::debug!(ts, "seek warming up, retrying one interval later");
                ts += interval_ms;
            }
            RenderOutcome::Failure(e) => {
                return Err(e).with_context(|| format!("render frame at {ts}ms"));
            }
            RenderOutcome::Skipped => anyhow::bail!("renderer skipped an uncontended request"),
        }
    };

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        frame.pixels(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({}ms)", args.out.display(), frame.timestamp_ms());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let timeline = Arc::new(Timeline::from_path(&args.in_path)?);
    let settings = PreviewSettings::load(args.config.as_deref())?;
    let factory = Arc::new(SyntheticFactory::new(settings.synthetic));

    let gate = RenderGate::new(Renderer::new(
        timeline.clone(),
        settings.renderer.clone(),
        factory.as_ref(),
    )?);
    let mut engine = PlaybackEngine::new(
        timeline,
        settings.renderer.clone(),
        settings.engine,
        factory,
    )?;
    engine.start(args.from)?;
    if !engine.wait_warm(Duration::from_secs(5)) {
        tracing::warn!("playback engine produced no frame within 5s");
    }

    let clock = PlaybackClock::new(ClockOpts {
        fps: settings.renderer.fps,
        threads: args.threads.or(ClockOpts::default().threads),
    })?;
    let clock_report = clock.drive(args.from, args.ticks, |ts| {
        if engine.try_get_frame(ts).is_some() {
            return OutcomeKind::Success;
        }
        gate.try_render(ts).kind()
    });
    engine.stop();

    let report = PlayReport {
        clock: clock_report,
        gate: gate.stats(),
        renderer: gate.renderer_stats(),
        engine: engine.stats(),
    };
    gate.destroy();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
