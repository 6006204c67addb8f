use std::{
    fs,
    path::{Path, PathBuf},
};

use xpense_core::CoreError;

const TRANSACTIONS_FILE: &str = "transactions.json";
const BUDGETS_FILE: &str = "budgets.json";
const HISTORY_FILE: &str = "notification_state.json";
const OUTBOX_FILE: &str = "notifications.jsonl";

/// File layout under a single data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the data directory if it is missing.
    pub fn ensure(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transactions(&self) -> PathBuf {
        self.root.join(TRANSACTIONS_FILE)
    }

    pub fn budgets(&self) -> PathBuf {
        self.root.join(BUDGETS_FILE)
    }

    pub fn history(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn outbox(&self) -> PathBuf {
        self.root.join(OUTBOX_FILE)
    }
}
