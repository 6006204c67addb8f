//! Periodic threshold checks on a background thread.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Condvar, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{AppError, ExpenseTracker};

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn raise(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *stopped = true;
        self.wake.notify_all();
    }

    /// Sleeps for `interval` unless stopped first. Returns `true` once stopped.
    fn wait(&self, interval: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, interval, |stopped| !*stopped)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stopped
    }
}

/// Runs a threshold check (and the daily reminder) immediately, then once per
/// interval until [`DailyTrigger::stop`] is called or the trigger is dropped.
pub struct DailyTrigger {
    signal: Arc<StopSignal>,
    ticks: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl DailyTrigger {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn start(tracker: Arc<ExpenseTracker>, interval: Duration) -> Result<Self, AppError> {
        if interval.is_zero() {
            return Err(AppError::Scheduler("check interval must be positive".into()));
        }
        let signal = Arc::new(StopSignal::default());
        let ticks = Arc::new(AtomicUsize::new(0));
        let handle = {
            let signal = Arc::clone(&signal);
            let ticks = Arc::clone(&ticks);
            thread::Builder::new()
                .name("expense-check".into())
                .spawn(move || loop {
                    tick(&tracker);
                    ticks.fetch_add(1, Ordering::SeqCst);
                    if signal.wait(interval) {
                        debug!("scheduler stopped");
                        break;
                    }
                })
                .map_err(|err| AppError::Scheduler(err.to_string()))?
        };
        info!(interval_secs = interval.as_secs(), "threshold scheduler started");
        Ok(Self {
            signal,
            ticks,
            handle: Some(handle),
        })
    }

    /// Number of completed check cycles.
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.raise();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("scheduler thread panicked");
            }
        }
    }
}

impl Drop for DailyTrigger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn tick(tracker: &ExpenseTracker) {
    match tracker.check_thresholds() {
        Ok(report) => debug!(raised = report.raised(), "scheduled check finished"),
        Err(err) => warn!(error = %err, "scheduled check failed"),
    }
    if let Err(err) = tracker.send_reminder_if_due() {
        warn!(error = %err, "daily reminder failed");
    }
}
