use std::{path::PathBuf, sync::Mutex};

use xpense_core::{CoreError, NotificationHistory, NotificationHistoryStore};

use crate::files::{read_json, write_json};

/// Keeps [`NotificationHistory`] in `notification_state.json`.
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl NotificationHistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<NotificationHistory, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        read_json(&self.path)
    }

    fn save(&self, history: &NotificationHistory) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        write_json(&self.path, history)
    }
}
