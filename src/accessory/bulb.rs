//! Simulated blinking bulb

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle, time::interval};
use tracing::{debug, info};

use super::AccessoryController;

/// A bulb that toggles its power every `blink_interval` while blinking
#[derive(Debug)]
pub struct BlinkingBulb {
    name: String,
    blink_interval: Duration,
    power: Arc<AtomicBool>,
    blink_task: Mutex<Option<JoinHandle<()>>>,
}

impl BlinkingBulb {
    pub fn new(name: String, blink_interval: Duration) -> Self {
        Self {
            name,
            blink_interval,
            power: Arc::new(AtomicBool::new(false)),
            blink_task: Mutex::new(None),
        }
    }

    /// Whether the simulated bulb is currently lit
    pub fn is_on(&self) -> bool {
        self.power.load(Ordering::SeqCst)
    }
}

impl AccessoryController for BlinkingBulb {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_blinking(&self) -> Result<(), String> {
        let mut task = self
            .blink_task
            .lock()
            .map_err(|e| format!("Failed to lock blink task: {}", e))?;
        if task.is_some() {
            debug!("{} is already blinking", self.name);
            return Ok(());
        }
        if self.blink_interval.is_zero() {
            return Err("Blink interval must be non-zero".to_string());
        }

        let runtime = Handle::try_current()
            .map_err(|e| format!("No runtime available for blinking: {}", e))?;

        let name = self.name.clone();
        let power = Arc::clone(&self.power);
        let period = self.blink_interval;
        *task = Some(runtime.spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let lit = !power.fetch_xor(true, Ordering::SeqCst);
                debug!("{} {}", name, if lit { "on" } else { "off" });
            }
        }));

        info!("{} started blinking", self.name);
        Ok(())
    }

    fn stop_blinking(&self) -> Result<(), String> {
        let mut task = self
            .blink_task
            .lock()
            .map_err(|e| format!("Failed to lock blink task: {}", e))?;

        if let Some(handle) = task.take() {
            handle.abort();
            self.power.store(false, Ordering::SeqCst);
            info!("{} stopped blinking", self.name);
        }
        Ok(())
    }

    fn is_blinking(&self) -> bool {
        self.blink_task
            .lock()
            .map(|task| task.is_some())
            .unwrap_or(false)
    }
}

impl Drop for BlinkingBulb {
    fn drop(&mut self) {
        if let Ok(mut task) = self.blink_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}
