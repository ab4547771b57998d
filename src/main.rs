//! Recorder binary
//!
//! Wires the frame source, trigger listeners, sink, and engine together.
//! Config path comes from the first CLI argument; missing file means
//! defaults.

use anyhow::Context;
use blackbox_dvr::capture::{self, TestPatternSource};
use blackbox_dvr::config::RecorderConfig;
use blackbox_dvr::engine::{EngineConfig, RecordingEngine};
use blackbox_dvr::sink::FrameBundleSink;
use blackbox_dvr::trigger;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blackbox_dvr=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blackbox DVR v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => RecorderConfig::load(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => {
            tracing::info!("No config file given, using defaults");
            RecorderConfig::default()
        }
    };

    let sink = Arc::new(
        FrameBundleSink::new(&config.storage_dir)
            .with_context(|| format!("failed to prepare storage dir {}", config.storage_dir))?,
    );

    // Event channel: every trigger source holds a clone of the sender
    let (trigger_tx, trigger_rx) = trigger::trigger_channel();
    let console_task = trigger::console::spawn(trigger_tx.clone());
    // Bus and button drivers are wired here on the vehicle build; each one
    // just needs its own clone of `trigger_tx`.

    // Frame source task. The test pattern stands in for the camera driver.
    let (frame_tx, frame_rx) = mpsc::channel(config.fps as usize * 2);
    let source = TestPatternSource::new(config.width, config.height, config.frame_interval());
    let capture_task = capture::source::spawn(Box::new(source), frame_tx);

    let engine = RecordingEngine::new(EngineConfig::from(&config), frame_rx, trigger_rx, sink);
    let engine_task = tokio::spawn(engine.run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    // Stopping the capture task closes the frame channel, which stops the
    // engine loop; any in-flight event recording is discarded.
    capture_task.abort();
    console_task.abort();
    drop(trigger_tx);
    let _ = engine_task.await;

    tracing::info!("System shut down");
    Ok(())
}
