//! Console response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerSnapshot;

/// Response printed after each timer command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl CommandResponse {
    /// Create a new command response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a running response
    pub fn running(message: String, timer: TimerSnapshot) -> Self {
        Self::new("running".to_string(), message, timer)
    }

    /// Create an idle response
    pub fn idle(message: String, timer: TimerSnapshot) -> Self {
        Self::new("idle".to_string(), message, timer)
    }

    /// Create an error response
    pub fn error(message: String, timer: TimerSnapshot) -> Self {
        Self::new("error".to_string(), message, timer)
    }

    /// Pick running/idle from the snapshot
    pub fn from_snapshot(message: String, timer: TimerSnapshot) -> Self {
        if timer.is_running {
            Self::running(message, timer)
        } else {
            Self::idle(message, timer)
        }
    }
}

/// Full status with application context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub title: String,
    pub accessory: String,
    pub blinking: bool,
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Console output line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsoleOutput {
    Command(CommandResponse),
    Status(StatusResponse),
    Help { commands: Vec<String> },
}

impl ConsoleOutput {
    /// Serialize as a single JSON line
    pub fn to_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"status\":\"error\",\"message\":\"{}\"}}", e))
    }
}
