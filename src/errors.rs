use thiserror::Error;
use xpense_config::ConfigError;
use xpense_core::CoreError;

/// Failures surfaced by the tracker facade.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl AppError {
    /// User-facing rejections (validation, duplicates, unknown ids) rather than faults.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::Core(err) if err.is_rejection())
    }
}
