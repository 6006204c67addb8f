//! xpense-storage-json
//!
//! Filesystem persistence for Expense Watch: the ledger (transactions and
//! budgets), the notification history and a JSON-lines alert outbox.

mod files;
pub mod history;
pub mod ledger;
pub mod outbox;
pub mod paths;

pub use history::JsonHistoryStore;
pub use ledger::JsonLedgerStore;
pub use outbox::{OutboxAlertSink, OutboxEntry};
pub use paths::StoragePaths;
