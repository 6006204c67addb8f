//! xpense-core
//!
//! Budget tracking and threshold notification logic for Expense Watch.
//! Depends on xpense-domain. No CLI, no terminal I/O; persistence is reached
//! only through the [`storage::LedgerStore`] and
//! [`notifier::NotificationHistoryStore`] traits.

pub mod aggregator;
pub mod budget_service;
pub mod error;
pub mod evaluator;
pub mod notifier;
pub mod period;
pub mod reminder;
pub mod storage;
pub mod time;
pub mod transaction_service;

pub use aggregator::*;
pub use budget_service::*;
pub use error::CoreError;
pub use evaluator::*;
pub use notifier::*;
pub use period::*;
pub use reminder::*;
pub use storage::*;
pub use time::*;
pub use transaction_service::*;

#[cfg(test)]
mod tests;
