//! xpense-config
//!
//! User preferences for Expense Watch: alert toggles, thresholds, cooldown,
//! week start and the data directory, plus JSON persistence with backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
