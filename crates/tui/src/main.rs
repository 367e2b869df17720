mod renderer;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use lifegrid_core::model::{LifeProfile, TemporalSnapshot};
use lifegrid_core::svg::render_svg;
use lifegrid_core::{GridConfig, LifeGrid};

/// Your life in weeks, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "lifegrid", author, version, about, long_about = None)]
struct Args {
    /// Life profile JSON. The built-in demo profile is used when omitted.
    profile: Option<PathBuf>,

    /// Date treated as "now" (YYYY-MM-DD). Defaults to the local date.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Grid config JSON with overrides for any default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a still SVG here instead of starting the terminal UI.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Frames simulated before the SVG still is taken.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// SVG width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// SVG height in pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Use the light palette.
    #[arg(long)]
    light: bool,

    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,
}

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let profile = match &args.profile {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LifeProfile::from_json(&data).with_context(|| format!("parsing {}", path.display()))?
        }
        None => LifeProfile::demo(),
    };
    let config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GridConfig::from_json(&data).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GridConfig::default(),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = TemporalSnapshot::build(&profile, today)?;
    tracing::debug!(
        weeks = snapshot.total_weeks(),
        spans = snapshot.spans.len(),
        %today,
        "loaded profile"
    );

    let mut grid = LifeGrid::new(config);
    grid.render(&snapshot);

    match &args.svg {
        Some(out) => export_svg(&mut grid, &args, out),
        None => renderer::run_tui(&mut grid, &snapshot, !args.light, FRAME),
    }
}

fn export_svg(grid: &mut LifeGrid, args: &Args, out: &Path) -> Result<()> {
    grid.resize(args.width, args.height);
    let dt = FRAME.as_secs_f64() * 1000.0;
    for _ in 0..args.frames.max(1) {
        grid.on_frame(dt);
    }
    let svg = render_svg(&grid.commands(), args.width, args.height, !args.light);
    std::fs::write(out, svg).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote svg");
    Ok(())
}
