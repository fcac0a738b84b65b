//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    accessory::AccessoryController,
    timer::{TimerConfiguration, TimerEngine, TimerError, TimerSnapshot},
};

/// Main application state shared by the console and background tasks
pub struct AppState {
    /// The countdown engine
    pub engine: TimerEngine,
    /// Accessory driven by timer completion
    pub accessory: Arc<dyn AccessoryController>,
    /// Label shown above the countdown
    pub title: String,
    /// Application metadata
    pub start_time: Instant,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState around an engine and accessory
    pub fn new(
        engine: TimerEngine,
        accessory: Arc<dyn AccessoryController>,
        title: String,
    ) -> Self {
        Self {
            engine,
            accessory,
            title,
            start_time: Instant::now(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a timer command and record it as the last action
    pub fn run_action<F>(&self, action: &str, command: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&TimerEngine) -> Result<(), TimerError>,
    {
        command(&self.engine).map_err(|e| format!("Failed to {} timer: {}", action, e))?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(self.engine.snapshot())
    }

    /// Set the countdown duration for the next start
    pub fn set_time(&self, configuration: TimerConfiguration) -> Result<TimerSnapshot, String> {
        info!("Setting timer duration to: {}", configuration);
        self.run_action("set", |engine| engine.set_configuration(configuration))
    }

    pub fn start(&self) -> Result<TimerSnapshot, String> {
        self.run_action("start", TimerEngine::start)
    }

    pub fn stop(&self) -> Result<TimerSnapshot, String> {
        self.run_action("stop", TimerEngine::stop)
    }

    pub fn toggle(&self) -> Result<TimerSnapshot, String> {
        self.run_action("toggle", TimerEngine::toggle)
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.run_action("reset", TimerEngine::reset)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop the timer and the accessory effect before exiting
    pub fn shutdown(&self) -> Result<(), String> {
        info!("Shutting down {}", self.title);
        self.engine
            .stop()
            .map_err(|e| format!("Failed to stop timer: {}", e))?;
        self.accessory.stop_blinking()
    }
}
