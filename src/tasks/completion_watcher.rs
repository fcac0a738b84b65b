//! Completion watcher background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{state::AppState, timer::TimerEvent};

/// Background task that drives the accessory from timer completion events
pub async fn completion_watcher_task(state: Arc<AppState>) {
    info!("Starting completion watcher for {}", state.accessory.name());

    let mut events = state.engine.events();
    // Catch up with anything that happened before we subscribed
    sync_accessory(&state);

    loop {
        match events.recv().await {
            Ok(TimerEvent::Finished) => {
                info!("{} finished, blinking {}", state.title, state.accessory.name());
                if let Err(e) = state.accessory.start_blinking() {
                    error!("Failed to start blinking: {}", e);
                }
            }
            Ok(TimerEvent::FinishCleared) => {
                info!("Completion cleared, stopping {}", state.accessory.name());
                if let Err(e) = state.accessory.stop_blinking() {
                    error!("Failed to stop blinking: {}", e);
                }
            }
            Ok(event) => {
                debug!("Completion watcher ignoring {:?}", event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion watcher lagged by {} events, resyncing", skipped);
                sync_accessory(&state);
            }
            Err(RecvError::Closed) => {
                info!("Timer event channel closed, stopping completion watcher");
                break;
            }
        }
    }
}

/// Make the accessory match the current completion flag
fn sync_accessory(state: &AppState) {
    let finished = state.engine.is_finished();
    let blinking = state.accessory.is_blinking();

    let result = match (finished, blinking) {
        (true, false) => state.accessory.start_blinking(),
        (false, true) => state.accessory.stop_blinking(),
        _ => Ok(()),
    };

    if let Err(e) = result {
        error!("Failed to sync accessory: {}", e);
    }
}
