use xpense_config::{Config, ConfigError, ConfigManager};
use xpense_domain::WeekStart;
use tempfile::tempdir;

#[test]
fn default_config_enables_alerts_only() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(cfg.budget_alerts_enabled);
    assert!(!cfg.daily_reminder_enabled);
    assert!(!cfg.suppress_per_budget_alerts);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert!(manager.backups_dir().exists());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        budget_alerts_enabled: false,
        daily_reminder_enabled: true,
        week_start: WeekStart::Monday,
        notification_cooldown_hours: 12,
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn invalid_config_is_not_saved() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
    let cfg = Config {
        warning_threshold_percent: 110,
        exceeded_threshold_percent: 100,
        ..Config::default()
    };

    assert!(matches!(manager.save(&cfg), Err(ConfigError::Invalid(_))));
    assert!(!manager.config_path().exists());
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
    let cfg = Config {
        currency: "EUR".into(),
        ..Config::default()
    };

    let name = manager.backup(&cfg, Some("before reset")).expect("backup");
    assert!(name.ends_with("_before-reset.json"));
    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);
    assert_eq!(manager.restore(&name).expect("restore").currency, "EUR");
    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::Io(_))
    ));
}
