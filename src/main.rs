use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mediacull::decode::Ffmpeg;
use mediacull::pipeline::{RunReport, run_images, run_videos};
use mediacull::scanner::MediaKind;
use mediacull::{DedupConfig, KeyframePolicy};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mediacull",
    version,
    about = "Move near-duplicate images and videos into a quarantine folder"
)]
struct Cli {
    /// Log per-comparison detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recursively cull duplicate and garbage images into `<dir>/__DUPLICATES`
    Images(RunArgs),

    /// Cull duplicate videos (top level only) into `<dir>/__DUPLICATE_VIDEOS`
    Videos(RunArgs),

    /// Run the image pass, then the video pass
    All(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory to scan (default: the directory holding this executable)
    #[arg(short, long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// JSON file with settings; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum Hamming distance (of 64 bits) counted as a duplicate
    #[arg(short, long, env = "MEDIACULL_THRESHOLD")]
    threshold: Option<u32>,

    /// How keyframe matches combine for videos
    #[arg(long, value_enum)]
    keyframe_policy: Option<KeyframePolicy>,

    /// Only show what would be moved
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// ffmpeg executable used to extract video frames
    #[arg(long, value_name = "PATH")]
    ffmpeg: Option<PathBuf>,

    /// ffprobe executable used to count video frames
    #[arg(long, value_name = "PATH")]
    ffprobe: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    run(&cli, &mut std::io::stdout().lock())
}

/// Everything for stdout goes through `out`; with `--json` that is only the
/// JSON array of run reports.
fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let (args, kinds) = match &cli.command {
        Commands::Images(args) => (args, vec![MediaKind::Image]),
        Commands::Videos(args) => (args, vec![MediaKind::Video]),
        Commands::All(args) => (args, vec![MediaKind::Image, MediaKind::Video]),
    };
    let config = build_config(args)?;

    let mut reports = Vec::new();
    for kind in kinds {
        if !args.json {
            let label = match kind {
                MediaKind::Image => "images",
                MediaKind::Video => "videos",
            };
            writeln!(out, "▶ Scanning for {} in: {}", label, config.root.display())?;
        }
        let progress = progress_bar(args.json || cli.quiet)?;
        let report = match kind {
            MediaKind::Image => run_images(&config, &progress),
            MediaKind::Video => {
                let decoder = Ffmpeg::new(&config.ffmpeg, &config.ffprobe);
                run_videos(&config, &decoder, &progress)
            }
        }
        .with_context(|| format!("Failed to cull {}", config.root.display()))?;
        progress.finish_and_clear();

        if !args.json {
            print_summary(out, &report)?;
        }
        reports.push(report);
    }

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mediacull={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then command-line flags.
fn build_config(args: &RunArgs) -> Result<DedupConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => DedupConfig::default(),
    };

    if let Some(path) = &args.path {
        config.root = path.clone();
    } else if args.config.is_none() {
        config.root = executable_dir()?;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(policy) = args.keyframe_policy {
        config.keyframe_policy = policy;
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        config.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &args.ffprobe {
        config.ffprobe = ffprobe.clone();
    }
    config.dry_run |= args.dry_run;

    config
        .validate()
        .with_context(|| format!("Cannot scan {}", config.root.display()))?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<DedupConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Executable has no parent directory")
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} fingerprinted",
    )?);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn print_summary(out: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    let summary = &report.summary;
    writeln!(out, "\n📊 Summary:")?;
    match report.media {
        MediaKind::Image => {
            writeln!(out, "Garbage files moved: {}", summary.garbage)?;
            writeln!(out, "Valid images read: {}", summary.scanned)?;
            writeln!(out, "Visually similar images moved: {}", summary.duplicates)?;
            writeln!(out, "Images remaining in original folder: {}", summary.remaining())?;
        }
        MediaKind::Video => {
            writeln!(out, "Videos scanned: {}", summary.scanned)?;
            writeln!(out, "Duplicates moved: {}", summary.duplicates)?;
            writeln!(out, "Remaining videos: {}", summary.remaining())?;
        }
    }
    if summary.failed > 0 {
        writeln!(out, "⚠️  Skipped (unreadable or unmovable): {}", summary.failed)?;
    }
    match &report.report_file {
        Some(path) => writeln!(out, "Log saved to: {}", path.display()),
        None => writeln!(out, "\n⚠️  Dry-run only; no files were changed."),
    }
}
