//! State management module
//!
//! This module contains the application state shared between the console and
//! the background tasks.

pub mod app_state;

// Re-export main types
pub use app_state::AppState;
