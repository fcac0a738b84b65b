//! Countdown timer engine
//!
//! The engine owns a single run at a time and counts it down one second per
//! scheduler tick. All state lives behind one lock; every mutation publishes a
//! fresh `TimerSnapshot` on a watch channel while the lock is still held, so
//! observers see changes in the order they happened.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Stopped | Finished) -> Idle (reset) or Running (start)
//! ```

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info};

use super::{
    format_hms, progress_fraction, Scheduler, Subscription, TimerConfiguration, TimerError,
    TimerSnapshot,
};

/// Interval between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What `toggle` does when the timer is stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Start a fresh run from the full configured duration
    #[default]
    Restart,
    /// Continue a stopped, unfinished run from its remaining time
    Resume,
}

/// Lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    Started { total_seconds: u64 },
    Resumed { remaining_seconds: u64 },
    Stopped { remaining_seconds: u64 },
    Reset { total_seconds: u64 },
    Tick { remaining_seconds: u64 },
    /// `is_finished` went from false to true
    Finished,
    /// `is_finished` went from true to false
    FinishCleared,
}

struct RunState {
    configuration: TimerConfiguration,
    total_seconds: u64,
    remaining_seconds: u64,
    is_running: bool,
    is_finished: bool,
    run_id: u64,
    subscription: Option<Box<dyn Subscription>>,
}

impl RunState {
    fn new() -> Self {
        Self {
            configuration: TimerConfiguration::default(),
            total_seconds: 0,
            remaining_seconds: 0,
            is_running: false,
            is_finished: false,
            run_id: 0,
            subscription: None,
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            configuration: self.configuration,
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            is_running: self.is_running,
            is_finished: self.is_finished,
            progress: progress_fraction(self.remaining_seconds, self.total_seconds),
            display_time: format_hms(self.remaining_seconds),
        }
    }

    /// Cancel the live subscription, returns whether the timer was running
    fn halt(&mut self) -> bool {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        std::mem::replace(&mut self.is_running, false)
    }
}

struct Shared {
    state: Mutex<RunState>,
    scheduler: Arc<dyn Scheduler>,
    mode: ToggleMode,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
    event_tx: broadcast::Sender<TimerEvent>,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, RunState>, TimerError> {
        self.state.lock().map_err(|_| TimerError::StatePoisoned)
    }

    fn publish(&self, state: &RunState) {
        if let Err(e) = self.snapshot_tx.send(state.snapshot()) {
            error!("Failed to publish timer snapshot: {}", e);
        }
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is a normal condition
        if self.event_tx.send(event).is_err() {
            debug!("No listeners for timer event");
        }
    }
}

/// Countdown timer engine.
///
/// Cloning yields another handle to the same timer.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Shared>,
}

impl TimerEngine {
    /// Create an idle engine in restart-on-toggle mode
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_mode(scheduler, ToggleMode::Restart)
    }

    pub fn with_mode(scheduler: Arc<dyn Scheduler>, mode: ToggleMode) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::new());
        let (event_tx, _) = broadcast::channel(64);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RunState::new()),
                scheduler,
                mode,
                snapshot_tx,
                _snapshot_rx: snapshot_rx,
                event_tx,
            }),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Latest published state
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Watch every state change
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Receive lifecycle events
    pub fn events(&self) -> broadcast::Receiver<TimerEvent> {
        self.shared.event_tx.subscribe()
    }

    pub fn mode(&self) -> ToggleMode {
        self.shared.mode
    }

    pub fn is_running(&self) -> bool {
        self.shared.snapshot_tx.borrow().is_running
    }

    pub fn is_finished(&self) -> bool {
        self.shared.snapshot_tx.borrow().is_finished
    }

    pub fn progress(&self) -> f64 {
        self.shared.snapshot_tx.borrow().progress
    }

    pub fn display_time(&self) -> String {
        self.shared.snapshot_tx.borrow().display_time.clone()
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.shared.snapshot_tx.borrow().remaining_seconds)
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.shared.snapshot_tx.borrow().total_seconds)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration used by the next `start`
    pub fn set_configuration(&self, configuration: TimerConfiguration) -> Result<(), TimerError> {
        let mut state = self.shared.lock()?;
        state.configuration = configuration;
        debug!("Timer configured for {}", configuration);
        self.shared.publish(&state);
        Ok(())
    }

    /// Begin a fresh run from the configured duration.
    ///
    /// Any run in progress is replaced. The new tick subscription is acquired
    /// before the old one is cancelled, so a scheduler failure leaves the
    /// engine exactly as it was; the run id keeps the old stream from ever
    /// touching the new run.
    pub fn start(&self) -> Result<(), TimerError> {
        let mut state = self.shared.lock()?;
        self.start_locked(&mut state)
    }

    /// Stop ticking. Remaining time, progress and completion are kept.
    pub fn stop(&self) -> Result<(), TimerError> {
        let mut state = self.shared.lock()?;
        self.stop_locked(&mut state);
        Ok(())
    }

    /// Stop if running, otherwise start (or resume, in `ToggleMode::Resume`)
    pub fn toggle(&self) -> Result<(), TimerError> {
        let mut state = self.shared.lock()?;
        if state.is_running {
            self.stop_locked(&mut state);
            return Ok(());
        }
        match self.shared.mode {
            ToggleMode::Restart => self.start_locked(&mut state),
            ToggleMode::Resume => self.resume_locked(&mut state),
        }
    }

    /// Stop and restore the run to its full duration
    pub fn reset(&self) -> Result<(), TimerError> {
        let mut state = self.shared.lock()?;
        if !state.is_running
            && !state.is_finished
            && state.remaining_seconds == state.total_seconds
        {
            debug!("Reset requested while timer already reset");
            return Ok(());
        }

        state.halt();
        let was_finished = std::mem::replace(&mut state.is_finished, false);
        state.remaining_seconds = state.total_seconds;

        info!("Timer reset to {}", format_hms(state.total_seconds));
        self.shared.publish(&state);
        if was_finished {
            self.shared.emit(TimerEvent::FinishCleared);
        }
        self.shared.emit(TimerEvent::Reset {
            total_seconds: state.total_seconds,
        });
        Ok(())
    }

    fn start_locked(&self, state: &mut RunState) -> Result<(), TimerError> {
        let run_id = state.run_id.wrapping_add(1);
        let subscription = self.subscribe_ticks(run_id)?;

        state.halt();
        let was_finished = state.is_finished;

        state.run_id = run_id;
        state.subscription = Some(subscription);
        state.total_seconds = state.configuration.total_seconds();
        state.remaining_seconds = state.total_seconds;
        state.is_running = true;
        state.is_finished = false;

        info!("Timer started for {}", format_hms(state.total_seconds));
        self.shared.publish(state);
        if was_finished {
            self.shared.emit(TimerEvent::FinishCleared);
        }
        self.shared.emit(TimerEvent::Started {
            total_seconds: state.total_seconds,
        });
        Ok(())
    }

    fn stop_locked(&self, state: &mut RunState) {
        if !state.halt() {
            debug!("Stop requested while timer idle");
            return;
        }

        info!("Timer stopped at {}", format_hms(state.remaining_seconds));
        self.shared.publish(state);
        self.shared.emit(TimerEvent::Stopped {
            remaining_seconds: state.remaining_seconds,
        });
    }

    fn resume_locked(&self, state: &mut RunState) -> Result<(), TimerError> {
        if state.is_running {
            return Ok(());
        }
        if state.is_finished || state.remaining_seconds == 0 {
            return self.start_locked(state);
        }

        let run_id = state.run_id.wrapping_add(1);
        state.subscription = Some(self.subscribe_ticks(run_id)?);
        state.run_id = run_id;
        state.is_running = true;

        info!("Timer resumed at {}", format_hms(state.remaining_seconds));
        self.shared.publish(state);
        self.shared.emit(TimerEvent::Resumed {
            remaining_seconds: state.remaining_seconds,
        });
        Ok(())
    }

    fn subscribe_ticks(&self, run_id: u64) -> Result<Box<dyn Subscription>, TimerError> {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        self.shared
            .scheduler
            .every(
                TICK_INTERVAL,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        on_tick(&shared, run_id);
                    }
                }),
            )
            .map_err(|e| {
                error!("Failed to schedule timer ticks: {}", e);
                e
            })
    }
}

/// Advance the run by one second
fn on_tick(shared: &Shared, run_id: u64) {
    let mut state = match shared.lock() {
        Ok(state) => state,
        Err(e) => {
            error!("Dropping tick: {}", e);
            return;
        }
    };

    // Late tick from a cancelled subscription
    if state.run_id != run_id || state.subscription.is_none() {
        debug!("Ignoring stale tick for run {}", run_id);
        return;
    }

    if state.remaining_seconds > 0 {
        state.remaining_seconds -= 1;
    }
    debug!("Tick: {} remaining", format_hms(state.remaining_seconds));

    let finished_now = state.remaining_seconds == 0;
    if finished_now {
        state.halt();
        state.is_finished = true;
        info!("Timer finished");
    }

    shared.publish(&state);
    shared.emit(TimerEvent::Tick {
        remaining_seconds: state.remaining_seconds,
    });
    if finished_now {
        shared.emit(TimerEvent::Finished);
    }
}
