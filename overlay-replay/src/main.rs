//! # Overlay Replay
//!
//! Replays a recorded editing session and prints the resulting document.

use anyhow::Context;
use clap::Parser;
use overlay_replay::{replay, CliArgs, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,overlay_core=debug,overlay_replay=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ReplayConfig::from(args);
    tracing::debug!("Replay config: {:?}", config);

    let outcome = replay(&config)
        .with_context(|| format!("Failed to replay {}", config.script.display()))?;

    if !outcome.skipped.is_empty() {
        tracing::warn!("{} steps were skipped", outcome.skipped.len());
    }

    let json = outcome
        .to_json(config.pretty, config.include_scene)
        .context("Failed to serialize replay outcome")?;
    println!("{json}");
    Ok(())
}
