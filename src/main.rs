//! Cast Monitor - replays the streaming dataset the way the dashboard consumes it.
//!
//! Loads both datasets, pulls batches until the stream is exhausted, feeds
//! them into the accumulator and prints a JSON report of the final state.

use anyhow::{Context, Result};
use cast_monitor::stats::{defect_rate, summarize_sensors, PASS_FAIL_COLUMN};
use cast_monitor::{DashboardConfig, SourceTables, StreamSession};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cast_monitor")]
#[command(about = "Replay casting process data batch by batch")]
struct Args {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "CAST_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing the dataset files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Rows per replay step
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Stop after this many batches
    #[arg(short, long)]
    max_batches: Option<usize>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cast_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(batch_size) = args.batch_size {
        config.default_batch_size = batch_size;
    }
    config.validate()?;

    let tables = SourceTables::load(&config).context("failed to load datasets")?;
    let mut session = StreamSession::new(&tables)?;

    let mut batches = 0usize;
    while args.max_batches.map_or(true, |max| batches < max) {
        if session.step(config.default_batch_size)?.is_none() {
            break;
        }
        batches += 1;

        let progress = session.stream_info();
        info!(
            batch = batches,
            current_index = progress.current_index,
            total_rows = progress.total_rows,
            progress = %format!("{:.1}%", progress.progress),
            "replay step"
        );
    }

    let accumulated = session.accumulated();
    let replayed = session.current_data();
    let report = serde_json::json!({
        "stream": session.stream_info(),
        "batches": batches,
        "accumulated_rows": accumulated.height(),
        "sensors": summarize_sensors(&replayed, &config),
        "defects": defect_rate(&replayed, PASS_FAIL_COLUMN),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
