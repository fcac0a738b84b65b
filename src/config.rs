//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::timer::{TimerConfiguration, ToggleMode};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown-lamp")]
#[command(about = "A countdown timer that blinks a smart bulb when time runs out")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Countdown duration as HH:MM:SS
    #[arg(short, long, default_value = "00:00:10")]
    pub time: TimerConfiguration,

    /// Title shown above the countdown
    #[arg(long, default_value = "Timer")]
    pub title: String,

    /// Name of the accessory to blink when the countdown ends
    #[arg(short, long, default_value = "Bulb")]
    pub accessory: String,

    /// Blink interval in milliseconds
    #[arg(long, default_value = "500")]
    pub blink_interval_ms: u64,

    /// Resume a stopped countdown on toggle instead of restarting it
    #[arg(long)]
    pub resume: bool,

    /// Start the countdown immediately
    #[arg(long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Toggle behavior selected by the resume flag
    pub fn toggle_mode(&self) -> ToggleMode {
        if self.resume { ToggleMode::Resume } else { ToggleMode::Restart }
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }
}
