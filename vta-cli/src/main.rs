//! VTA CLI Tool
//!
//! Command-line interface for inspecting timeline action logs offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use vta_compositor::{Compositor, Stage, SvgStore};
use vta_core::format::format_count;
use vta_core::markers::cluster_markers_with_margin;
use vta_core::{ActionKind, ActionLog, EngineConfig, Marker, Playhead, DISPOSE_TIMEOUT_SECS, MARKER_PIXEL_MARGIN};

#[derive(Parser)]
#[command(name = "vta")]
#[command(about = "VTA (Video Timeline Annotations) - evaluate overlay, timer and variable state")]
#[command(version)]
struct Cli {
    /// Log at info level instead of warn
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the annotation frame at a playback time
    Eval {
        /// Action log JSON file
        log: PathBuf,

        /// Playback time in seconds
        #[arg(short, long)]
        time: f64,

        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Markers JSON file
        #[arg(long)]
        markers: Option<PathBuf>,

        /// Stage width in pixels
        #[arg(long, default_value = "1920")]
        width: f64,

        /// Stage height in pixels
        #[arg(long, default_value = "1080")]
        height: f64,

        /// Progress bar width in pixels
        #[arg(long, default_value = "1280")]
        bar_width: f64,

        /// Directory of preloaded `<key>.svg` graphics
        #[arg(long)]
        svg_dir: Option<PathBuf>,

        /// Seconds an overlay stays mounted after its window ends
        #[arg(long, default_value_t = DISPOSE_TIMEOUT_SECS)]
        dispose_timeout: f64,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Cluster progress-bar markers
    Markers {
        /// Markers JSON file
        input: PathBuf,

        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Progress bar width in pixels
        #[arg(long, default_value = "1280")]
        bar_width: f64,

        /// Minimum pixel distance between rendered markers
        #[arg(long, default_value_t = MARKER_PIXEL_MARGIN)]
        margin: f64,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show a summary of an action log
    Info {
        /// Action log JSON file
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Eval {
            log,
            time,
            duration,
            markers,
            width,
            height,
            bar_width,
            svg_dir,
            dispose_timeout,
            pretty,
        } => {
            let config = EngineConfig {
                dispose_timeout_secs: dispose_timeout,
                ..EngineConfig::default()
            };
            let stage = Stage::new(width, height, bar_width);
            eval(log, Playhead::new(time, duration), markers, stage, svg_dir, config, pretty)?
        }

        Commands::Markers {
            input,
            duration,
            bar_width,
            margin,
            pretty,
        } => {
            let markers = read_markers(&input)?;
            let clustered = cluster_markers_with_margin(&markers, duration, bar_width, margin);
            tracing::info!(input = markers.len(), rendered = clustered.len(), "Clustered markers");
            write_json(&clustered, pretty)?
        }

        Commands::Info { log } => info(log)?,
    }

    Ok(())
}

fn eval(
    log_path: PathBuf,
    playhead: Playhead,
    markers_path: Option<PathBuf>,
    stage: Stage,
    svg_dir: Option<PathBuf>,
    config: EngineConfig,
    pretty: bool,
) -> Result<()> {
    let log = ActionLog::open(&log_path)
        .with_context(|| format!("Failed to read action log {}", log_path.display()))?;
    tracing::info!(actions = log.len(), skipped = log.skipped(), "Loaded action log");

    let markers = match markers_path {
        Some(path) => read_markers(&path)?,
        None => Vec::new(),
    };
    let svgs = match svg_dir {
        Some(dir) => SvgStore::load_dir(&dir)
            .with_context(|| format!("Failed to load graphics from {}", dir.display()))?,
        None => SvgStore::new(),
    };

    if !playhead.is_ready() {
        tracing::warn!(duration = playhead.duration_secs, "Playhead not ready, frame will be empty");
    }

    let compositor = Compositor::new(config).context("Failed to create compositor")?;
    let frame = compositor.compose(&log, &markers, playhead, &stage, &svgs);
    write_json(&frame, pretty)
}

fn read_markers(path: &Path) -> Result<Vec<Marker>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse markers from {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn info(log_path: PathBuf) -> Result<()> {
    let log = ActionLog::open(&log_path)
        .with_context(|| format!("Failed to read action log {}", log_path.display()))?;

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    let mut timers = BTreeSet::new();
    let mut variables = BTreeSet::new();
    let mut overlays = BTreeSet::new();

    for action in log.actions() {
        *by_type.entry(action.kind.type_name()).or_default() += 1;
        match &action.kind {
            ActionKind::CreateTimer(create) => {
                timers.insert(create.name.as_str());
            }
            ActionKind::SetVariable(set) => {
                variables.insert(set.name.as_str());
            }
            ActionKind::ShowOverlay(show) => {
                let key = show
                    .custom_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .unwrap_or(action.id.as_str());
                overlays.insert(key);
            }
            _ => {}
        }
    }

    println!("\n=== Action Log Information ===");
    println!("File: {}", log_path.display());
    println!("Actions: {} ({} skipped)", format_count(log.len() as f64), log.skipped());
    if let Some(update_id) = log.update_id() {
        println!("Update ID: {}", update_id);
    }

    let first = log.actions().iter().map(|a| a.offset_ms).min();
    let last = log.actions().iter().map(|a| a.offset_ms).max();
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "Offset span: {} ms to {} ms ({:.2} seconds)",
            first,
            last,
            (last - first) as f64 / 1000.0
        );
    }

    println!("Timers: {}", timers.len());
    println!("Variables: {}", variables.len());
    println!("Overlay keys: {}", overlays.len());

    println!("\n=== Actions by type ===");
    for (kind, count) in &by_type {
        println!("  {}: {}", kind, count);
    }

    Ok(())
}
