use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;
use xpense_core::{AlertSink, CoreError, DeliveryError};
use xpense_domain::{Alert, AlertKind, AlertScope};

use crate::files::write_atomic;

/// One delivered alert as stored in `notifications.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub delivered_at: NaiveDateTime,
    pub title: String,
    pub message: String,
    pub alert: Alert,
}

impl OutboxEntry {
    fn is_aggregate_threshold(&self) -> bool {
        self.alert.scope == AlertScope::Aggregate && self.alert.kind != AlertKind::Reminder
    }

    /// Alerts for the same scope replace each other; reminders only replace reminders.
    fn same_slot(&self, alert: &Alert) -> bool {
        let reminder = |kind: AlertKind| kind == AlertKind::Reminder;
        self.alert.scope == alert.scope && reminder(self.alert.kind) == reminder(alert.kind)
    }
}

/// Alert sink that keeps the latest alert per scope as JSON lines, for other
/// processes (or a later session) to pick up.
pub struct OutboxAlertSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutboxAlertSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry currently in the outbox, oldest first. Unreadable lines are skipped.
    pub fn entries(&self) -> Result<Vec<OutboxEntry>, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        read_entries(&self.path)
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl AlertSink for OutboxAlertSink {
    /// Stores the alert, replacing any earlier entry for the same slot.
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let entry = OutboxEntry {
            delivered_at: Local::now().naive_local(),
            title: alert.title(),
            message: alert.message(),
            alert: alert.clone(),
        };
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = read_entries(&self.path).map_err(unavailable)?;
        entries.retain(|existing| !existing.same_slot(alert));
        entries.push(entry);
        write_entries(&self.path, &entries)
    }

    /// Drops aggregate warning / exceeded entries so a stale total is not shown again.
    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = read_entries(&self.path).map_err(unavailable)?;
        entries.retain(|entry| !entry.is_aggregate_threshold());
        write_entries(&self.path, &entries)
    }
}

fn unavailable(err: CoreError) -> DeliveryError {
    DeliveryError::Unavailable(err.to_string())
}

fn write_entries(path: &Path, entries: &[OutboxEntry]) -> Result<(), DeliveryError> {
    let mut buffer = String::new();
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|err| DeliveryError::Unavailable(err.to_string()))?;
        buffer.push_str(&line);
        buffer.push('\n');
    }
    write_atomic(path, buffer.as_bytes()).map_err(unavailable)
}

fn read_entries(path: &Path) -> Result<Vec<OutboxEntry>, CoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(fs::File::open(path)?);
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(line = index + 1, error = %err, "skipping malformed outbox entry"),
        }
    }
    Ok(entries)
}
