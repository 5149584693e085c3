// ================================
// src/main.rs
// ================================
use anyhow::{Context, Result};
use circle_seeker::{
    bridge::{forward_frames, LineSink},
    node::scan_channel,
    NavConfig, NavigationNode, Navigator,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries commands, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("circle_seeker=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Circle Seeker navigation node (TOML config)");

    let config_path = NavConfig::config_path();
    let config = NavConfig::load()
        .with_context(|| format!("Failed to load parameters from {}", config_path))?;
    info!("Config file: {}", config_path);
    if config.node.debug_mode {
        info!("=== Loaded Parameters ===\n{:#?}", config);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(config));
    // Stdin reads cannot be cancelled; do not wait on them.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(config: NavConfig) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })
    .context("Failed to install Ctrl-C handler")?;

    let (scan_sender, scan_receiver) = scan_channel(&config);
    let reader = tokio::spawn(forward_frames(tokio::io::stdin(), scan_sender));

    let mut node = NavigationNode::new(
        &config,
        Navigator::new(&config),
        scan_receiver,
        LineSink::new(std::io::stdout()),
    );
    let summary = node.run(shutdown_rx.clone()).await?;

    info!(
        "Stopped after {} cycles, {} commands, {} overruns, mode {}",
        summary.cycles,
        summary.commands,
        summary.overruns,
        summary.mode.as_str()
    );

    if *shutdown_rx.borrow() {
        reader.abort();
    } else {
        // The queue closed, so the reader has returned.
        let frames = reader.await?.context("Scan reader failed")?;
        info!("Read {} frames", frames);
    }

    Ok(())
}
