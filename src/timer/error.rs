//! Timer error types

use thiserror::Error;

/// Errors surfaced by the timer engine and its configuration boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A configuration field is outside its allowed range
    #[error("Invalid {field}: {value} (must be between 0 and {max})")]
    InvalidConfiguration {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Input could not be parsed as `HH:MM:SS`
    #[error("Malformed time '{0}', expected HH:MM:SS")]
    MalformedTime(String),

    /// The tick scheduler could not provide a subscription
    #[error("Scheduler unavailable: {0}")]
    SchedulerUnavailable(String),

    /// A thread panicked while holding the engine state lock
    #[error("Timer state lock poisoned")]
    StatePoisoned,
}
