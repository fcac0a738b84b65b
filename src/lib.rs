//! Countdown Lamp - a countdown timer that blinks a smart bulb on completion
//!
//! This library provides a UI-agnostic countdown timer engine plus the
//! application pieces that wire its completion signal to an accessory.

pub mod config;
pub mod timer;
pub mod state;
pub mod console;
pub mod accessory;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use timer::{TimerEngine, TimerSnapshot};
pub use console::run_console;
pub use utils::signals::shutdown_signal;
