//! Reasongraph - infinite-canvas editor for reasoning graphs.
//!
//! Projects live in a single file in the data directory; nodes can be
//! expanded by a language model through OpenRouter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use iced::application;

use reasongraph::{AppConfig, Reasongraph};
use reasongraph_common::init_tracing;

/// Desktop editor for reasoning graphs.
#[derive(Parser, Debug)]
#[command(name = "reasongraph")]
#[command(about = "Infinite-canvas editor for reasoning graphs", long_about = None)]
struct Args {
    /// Path to the configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the project store.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    tracing::info!(
        store = %config.store_path().display(),
        format = ?config.storage_format,
        "Starting Reasongraph"
    );

    application(
        move || Reasongraph::boot(config.clone()),
        Reasongraph::update,
        Reasongraph::view,
    )
    .title(Reasongraph::title)
    .theme(Reasongraph::theme)
    .run()
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
