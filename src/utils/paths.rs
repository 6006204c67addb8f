use std::{env, path::PathBuf};

/// Overrides every on-disk location (config and data) when set.
pub const HOME_ENV: &str = "EXPENSE_CORE_HOME";

const APP_DIR: &str = "expense-watch";

/// Base directory for the configuration files.
pub fn config_base() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Data directory forced by the environment, if any.
pub fn data_override() -> Option<PathBuf> {
    env::var_os(HOME_ENV).map(|home| PathBuf::from(home).join("data"))
}
