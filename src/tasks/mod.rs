//! Background tasks module
//!
//! This module contains background tasks that observe the timer alongside
//! the console.

pub mod completion_watcher;
pub mod progress_reporter;

// Re-export main functions
pub use completion_watcher::completion_watcher_task;
pub use progress_reporter::{progress_bar, progress_reporter_task};
