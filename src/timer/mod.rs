//! Countdown timer module
//!
//! This module contains the timer engine, its configuration and observable
//! state, and the scheduler abstraction that drives it.

pub mod configuration;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod snapshot;

// Re-export main types
pub use configuration::TimerConfiguration;
pub use engine::{TimerEngine, TimerEvent, ToggleMode, TICK_INTERVAL};
pub use error::TimerError;
pub use scheduler::{ManualScheduler, Scheduler, Subscription, TickCallback, TokioScheduler};
pub use snapshot::{format_hms, progress_fraction, TimerSnapshot};
