//! Tick scheduling collaborators
//!
//! The engine only needs "call me every N seconds until I cancel". Two
//! schedulers are provided: `TokioScheduler` for real time, and
//! `ManualScheduler` for drivers that want to advance time themselves.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle, time::Instant};
use tracing::debug;

use super::TimerError;

/// Callback invoked once per interval
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Handle to a repeating callback
pub trait Subscription: Send {
    /// Stop delivering callbacks. Cancelling twice is a no-op.
    fn cancel(&mut self);
}

/// Source of repeating callbacks
pub trait Scheduler: Send + Sync {
    fn every(
        &self,
        interval: Duration,
        callback: TickCallback,
    ) -> Result<Box<dyn Subscription>, TimerError>;
}

/// Scheduler backed by a tokio interval task per subscription
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Use whichever runtime is current when `every` is called
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Always spawn onto the given runtime
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Result<Handle, TimerError> {
        match &self.handle {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current()
                .map_err(|e| TimerError::SchedulerUnavailable(e.to_string())),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn every(
        &self,
        interval: Duration,
        mut callback: TickCallback,
    ) -> Result<Box<dyn Subscription>, TimerError> {
        if interval.is_zero() {
            return Err(TimerError::SchedulerUnavailable(
                "tick interval must be non-zero".to_string(),
            ));
        }
        let runtime = self.runtime()?;

        let task = runtime.spawn(async move {
            // First tick lands one full interval after subscribing
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                callback();
            }
        });

        debug!("Tick task spawned with interval {:?}", interval);
        Ok(Box::new(TaskSubscription { task: Some(task) }))
    }
}

struct TaskSubscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription for TaskSubscription {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Tick task aborted");
        }
    }
}

impl Drop for TaskSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ManualSlot {
    callback: Mutex<TickCallback>,
    cancelled: AtomicBool,
}

#[derive(Default)]
struct ManualInner {
    slots: Mutex<Vec<Arc<ManualSlot>>>,
    subscribed: AtomicUsize,
    cancelled: AtomicUsize,
    unavailable: AtomicBool,
}

/// Scheduler whose ticks are fired explicitly with `advance`.
///
/// Clones share the same subscriptions, so a test can keep one clone and
/// hand another to the engine.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<ManualInner>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live subscription `ticks` times
    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            self.fire_once();
        }
    }

    fn fire_once(&self) {
        // Snapshot the slots so callbacks may cancel without deadlocking
        let slots: Vec<Arc<ManualSlot>> = match self.inner.slots.lock() {
            Ok(slots) => slots.clone(),
            Err(_) => return,
        };

        for slot in slots {
            if slot.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            if let Ok(mut callback) = slot.callback.lock() {
                (*callback)();
            }
        }

        if let Ok(mut slots) = self.inner.slots.lock() {
            slots.retain(|slot| !slot.cancelled.load(Ordering::SeqCst));
        }
    }

    /// Number of subscriptions not yet cancelled
    pub fn active_subscriptions(&self) -> usize {
        self.inner
            .slots
            .lock()
            .map(|slots| {
                slots
                    .iter()
                    .filter(|slot| !slot.cancelled.load(Ordering::SeqCst))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Total subscriptions ever handed out
    pub fn subscribe_count(&self) -> usize {
        self.inner.subscribed.load(Ordering::SeqCst)
    }

    /// Total subscriptions cancelled
    pub fn cancel_count(&self) -> usize {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Make subsequent `every` calls fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Scheduler for ManualScheduler {
    fn every(
        &self,
        _interval: Duration,
        callback: TickCallback,
    ) -> Result<Box<dyn Subscription>, TimerError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(TimerError::SchedulerUnavailable(
                "manual scheduler disabled".to_string(),
            ));
        }

        let slot = Arc::new(ManualSlot {
            callback: Mutex::new(callback),
            cancelled: AtomicBool::new(false),
        });
        self.inner
            .slots
            .lock()
            .map_err(|e| TimerError::SchedulerUnavailable(e.to_string()))?
            .push(Arc::clone(&slot));
        self.inner.subscribed.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ManualSubscription {
            slot,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct ManualSubscription {
    slot: Arc<ManualSlot>,
    inner: Arc<ManualInner>,
}

impl Subscription for ManualSubscription {
    fn cancel(&mut self) {
        if !self.slot.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}
