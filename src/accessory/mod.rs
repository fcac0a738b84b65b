//! Accessory control module
//!
//! The timer engine knows nothing about accessories. The application reacts
//! to completion events by driving an `AccessoryController`.

pub mod bulb;

// Re-export main types
pub use bulb::BlinkingBulb;

/// Sink for the completion side effect
pub trait AccessoryController: Send + Sync {
    /// Display name of the accessory
    fn name(&self) -> &str;

    /// Begin the completion effect. Calling while already blinking is a no-op.
    fn start_blinking(&self) -> Result<(), String>;

    /// End the completion effect. Calling while idle is a no-op.
    fn stop_blinking(&self) -> Result<(), String>;

    fn is_blinking(&self) -> bool;
}
