use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use xpense_domain::WeekStart;

use crate::ConfigError;

const DATA_DIR_NAME: &str = "expense-watch";

/// User preferences that steer budget checks and reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_true")]
    pub budget_alerts_enabled: bool,
    #[serde(default)]
    pub daily_reminder_enabled: bool,
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default = "Config::default_warning_threshold")]
    pub warning_threshold_percent: u8,
    #[serde(default = "Config::default_exceeded_threshold")]
    pub exceeded_threshold_percent: u8,
    #[serde(default = "Config::default_cooldown_hours")]
    pub notification_cooldown_hours: u32,
    /// Hold per-budget alerts back while the aggregate alert is cooling down.
    #[serde(default)]
    pub suppress_per_budget_alerts: bool,
    #[serde(default = "Config::default_check_interval_hours")]
    pub check_interval_hours: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `<data dir>/expense-watch`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            budget_alerts_enabled: true,
            daily_reminder_enabled: false,
            week_start: WeekStart::default(),
            warning_threshold_percent: Self::default_warning_threshold(),
            exceeded_threshold_percent: Self::default_exceeded_threshold(),
            notification_cooldown_hours: Self::default_cooldown_hours(),
            suppress_per_budget_alerts: false,
            check_interval_hours: Self::default_check_interval_hours(),
            data_root: None,
        }
    }
}

impl Config {
    fn default_true() -> bool {
        true
    }

    pub fn default_warning_threshold() -> u8 {
        90
    }

    pub fn default_exceeded_threshold() -> u8 {
        100
    }

    pub fn default_cooldown_hours() -> u32 {
        24
    }

    pub fn default_check_interval_hours() -> u32 {
        24
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DATA_DIR_NAME)
    }

    /// Rejects threshold and interval combinations the notifier cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warning_threshold_percent == 0 {
            return Err(ConfigError::Invalid(
                "warning threshold must be above 0%".into(),
            ));
        }
        if self.warning_threshold_percent > self.exceeded_threshold_percent {
            return Err(ConfigError::Invalid(format!(
                "warning threshold ({}%) cannot exceed the exceeded threshold ({}%)",
                self.warning_threshold_percent, self.exceeded_threshold_percent
            )));
        }
        if self.check_interval_hours == 0 {
            return Err(ConfigError::Invalid(
                "check interval must be at least one hour".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{"locale":"en-GB","currency":"GBP"}"#).expect("parse");
        assert!(cfg.budget_alerts_enabled);
        assert!(!cfg.daily_reminder_enabled);
        assert_eq!(cfg.week_start, WeekStart::Sunday);
        assert_eq!(cfg.warning_threshold_percent, 90);
        assert_eq!(cfg.exceeded_threshold_percent, 100);
        assert_eq!(cfg.notification_cooldown_hours, 24);
        assert_eq!(cfg.data_root, None);
    }

    #[test]
    fn explicit_data_root_wins() {
        let cfg = Config {
            data_root: Some(PathBuf::from("/tmp/ledger")),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_data_root(), PathBuf::from("/tmp/ledger"));
        assert!(Config::default().resolve_data_root().ends_with(DATA_DIR_NAME));
    }

    #[test]
    fn inverted_thresholds_are_invalid() {
        let cfg = Config {
            warning_threshold_percent: 120,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        assert!(Config::default().validate().is_ok());
    }
}
