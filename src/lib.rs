#![doc(test(attr(deny(warnings))))]

//! Expense Watch ties the budget engine to real collaborators: JSON storage,
//! the system clock, console and outbox alert delivery, a periodic check
//! trigger and an interactive shell.

pub mod app;
pub mod cli;
pub mod clock;
pub mod errors;
pub mod scheduler;
pub mod sinks;
pub mod utils;

pub use app::{ExpenseTracker, TrackerOptions};
pub use errors::AppError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Watch tracing initialized.");
    });
}
