//! Timer configuration and `HH:MM:SS` parsing

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use super::TimerError;

pub const MAX_HOURS: u64 = 23;
pub const MAX_MINUTES: u64 = 59;
pub const MAX_SECONDS: u64 = 59;

/// Hours, minutes and seconds chosen by the user.
///
/// `new` and `from_str` enforce the picker ranges. The engine itself accepts
/// any value built with `unchecked` and only ever sums the fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimerConfiguration {
    /// Create a validated configuration
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Result<Self, TimerError> {
        check_range("hours", hours, MAX_HOURS)?;
        check_range("minutes", minutes, MAX_MINUTES)?;
        check_range("seconds", seconds, MAX_SECONDS)?;
        Ok(Self::unchecked(hours, minutes, seconds))
    }

    /// Create a configuration without range checks
    pub fn unchecked(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Total duration in whole seconds
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs(self.total_seconds())
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), TimerError> {
    if value > max {
        return Err(TimerError::InvalidConfiguration { field, value, max });
    }
    Ok(())
}

impl fmt::Display for TimerConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl FromStr for TimerConfiguration {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(TimerError::MalformedTime(s.to_string()));
        }

        let mut fields = [0u64; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| TimerError::MalformedTime(s.to_string()))?;
        }

        Self::new(fields[0], fields[1], fields[2])
    }
}
