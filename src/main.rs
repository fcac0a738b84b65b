//! Countdown Lamp - a countdown timer that blinks a smart bulb on completion
//!
//! This is the main entry point for the countdown-lamp application.

use std::sync::Arc;
use tokio::io::stdout;
use tracing::info;

use countdown_lamp::{
    accessory::BlinkingBulb,
    config::Config,
    console::{run_console, spawn_line_reader},
    state::AppState,
    tasks::{completion_watcher_task, progress_reporter_task},
    timer::{TimerEngine, TokioScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout carries only console responses
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_lamp={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting countdown-lamp v1.0.0");
    info!("Configuration: title={}, time={}, accessory={}, toggle={:?}",
          config.title, config.time, config.accessory, config.toggle_mode());

    // Create the timer engine and accessory
    let engine = TimerEngine::with_mode(Arc::new(TokioScheduler::new()), config.toggle_mode());
    let bulb = BlinkingBulb::new(config.accessory.clone(), config.blink_interval());
    let state = Arc::new(AppState::new(engine, Arc::new(bulb), config.title.clone()));

    state.set_time(config.time).map_err(anyhow::Error::msg)?;

    // Start the background observers
    let watcher = tokio::spawn(completion_watcher_task(Arc::clone(&state)));
    let reporter = tokio::spawn(progress_reporter_task(Arc::clone(&state)));

    if config.autostart {
        state.start().map_err(anyhow::Error::msg)?;
    }

    info!("Commands: set HH:MM:SS, start, stop, toggle, reset, status, help, quit");

    tokio::select! {
        result = run_console(&state, spawn_line_reader(std::io::BufReader::new(std::io::stdin())), stdout()) => {
            if let Err(e) = result {
                tracing::error!("Console error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.shutdown() {
        tracing::error!("Shutdown error: {}", e);
    }
    watcher.abort();
    reporter.abort();

    info!("Shutdown complete");
    Ok(())
}
