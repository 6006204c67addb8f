use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use expense_core::{ExpenseTracker, TrackerOptions};
use xpense_core::{FixedClock, MemoryHistoryStore, MemoryLedgerStore, RecordingSink};

/// Tracker wired to in-memory collaborators, with handles kept for assertions.
pub struct TestTracker {
    pub tracker: Arc<ExpenseTracker>,
    pub store: Arc<MemoryLedgerStore>,
    pub history: Arc<MemoryHistoryStore>,
    pub sink: Arc<RecordingSink>,
    pub clock: Arc<FixedClock>,
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("valid date")
        .and_hms_opt(h, 0, 0)
        .expect("valid time")
}

#[allow(dead_code)]
pub fn tracker() -> TestTracker {
    tracker_with(TrackerOptions::default())
}

pub fn tracker_with(options: TrackerOptions) -> TestTracker {
    let store = Arc::new(MemoryLedgerStore::new());
    let history = Arc::new(MemoryHistoryStore::default());
    let sink = Arc::new(RecordingSink::new());
    let clock = Arc::new(FixedClock::new(at(2024, 6, 15, 12)));
    let tracker = Arc::new(ExpenseTracker::new(
        store.clone(),
        history.clone(),
        sink.clone(),
        clock.clone(),
        options,
    ));
    TestTracker {
        tracker,
        store,
        history,
        sink,
        clock,
    }
}
