//! Observable timer state

use serde::{Deserialize, Serialize};

use super::TimerConfiguration;

/// Point-in-time copy of everything a consumer can observe about the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub configuration: TimerConfiguration,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_finished: bool,
    /// Fraction of the run still remaining, 1.0 when idle or total is zero
    pub progress: f64,
    pub display_time: String,
}

impl TimerSnapshot {
    /// Idle state before any run
    pub fn new() -> Self {
        Self {
            configuration: TimerConfiguration::default(),
            total_seconds: 0,
            remaining_seconds: 0,
            is_running: false,
            is_finished: false,
            progress: 1.0,
            display_time: format_hms(0),
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds as zero-padded `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Remaining fraction of a run
pub fn progress_fraction(remaining_seconds: u64, total_seconds: u64) -> f64 {
    if total_seconds == 0 {
        return 1.0;
    }
    remaining_seconds as f64 / total_seconds as f64
}
