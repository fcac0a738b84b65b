//! Progress reporter background task

use std::sync::Arc;
use tracing::{debug, info};

use crate::{state::AppState, timer::TimerSnapshot};

const BAR_WIDTH: usize = 20;

/// Background task that renders every timer snapshot to the log
pub async fn progress_reporter_task(state: Arc<AppState>) {
    info!("Starting progress reporter for {}", state.title);

    let mut snapshots = state.engine.subscribe();

    loop {
        if snapshots.changed().await.is_err() {
            debug!("Timer snapshot channel closed, stopping progress reporter");
            break;
        }

        let snapshot = snapshots.borrow_and_update().clone();
        info!("{}", render(&state.title, &snapshot));
    }
}

fn render(title: &str, snapshot: &TimerSnapshot) -> String {
    let status = if snapshot.is_finished {
        "done"
    } else if snapshot.is_running {
        "running"
    } else {
        "stopped"
    };

    format!(
        "{} {} [{}] {:>3}% {}",
        title,
        snapshot.display_time,
        progress_bar(snapshot.progress, BAR_WIDTH),
        (snapshot.progress * 100.0).round() as u64,
        status
    )
}

/// Render the remaining fraction as a fixed-width bar
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}
