//! Application facade wiring storage, clock, alert sinks and the notifier.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;
use xpense_config::Config;
use xpense_core::{
    AggregateUsage, AlertSink, BudgetEvaluator, BudgetService, BudgetUsage, CheckReport, Clock,
    FanoutSink, LedgerStore, MonthTotals, NotificationHistoryStore, NotifierSettings,
    PeriodResolver, SpendingAggregator, ThresholdNotifier, Thresholds, TransactionService,
};
use xpense_domain::{Budget, Transaction, WeekStart};
use xpense_storage_json::{JsonHistoryStore, JsonLedgerStore, OutboxAlertSink, StoragePaths};

use crate::{clock::SystemClock, AppError};

/// Tunables the tracker takes from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    pub settings: NotifierSettings,
    pub week_start: WeekStart,
    pub reminder_enabled: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            settings: NotifierSettings::default(),
            week_start: WeekStart::default(),
            reminder_enabled: false,
        }
    }
}

impl TrackerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings: NotifierSettings {
                alerts_enabled: config.budget_alerts_enabled,
                thresholds: Thresholds {
                    warning: config.warning_threshold_percent,
                    exceeded: config.exceeded_threshold_percent,
                },
                cooldown: Duration::hours(i64::from(config.notification_cooldown_hours)),
                suppress_per_budget: config.suppress_per_budget_alerts,
            },
            week_start: config.week_start,
            reminder_enabled: config.daily_reminder_enabled,
        }
    }
}

/// Budget tracking entry point. Budget mutations go through here so the
/// notifier sees every change.
pub struct ExpenseTracker {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    evaluator: BudgetEvaluator,
    notifier: Arc<ThresholdNotifier>,
    reminder_enabled: AtomicBool,
}

impl ExpenseTracker {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        history: Arc<dyn NotificationHistoryStore>,
        sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        options: TrackerOptions,
    ) -> Self {
        let evaluator = BudgetEvaluator::new(
            SpendingAggregator::new(PeriodResolver::new(options.week_start)),
            options.settings.thresholds,
        );
        let notifier = Arc::new(ThresholdNotifier::new(
            Arc::clone(&store),
            history,
            sink,
            Arc::clone(&clock),
            evaluator,
            options.settings,
        ));
        Self {
            store,
            clock,
            evaluator,
            notifier,
            reminder_enabled: AtomicBool::new(options.reminder_enabled),
        }
    }

    /// Opens the JSON stores under the configured data directory. Alerts go to
    /// `foreground` and to the on-disk outbox.
    pub fn open(
        config: &Config,
        data_root: Option<std::path::PathBuf>,
        foreground: impl AlertSink + 'static,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let paths = StoragePaths::new(data_root.unwrap_or_else(|| config.resolve_data_root()));
        let store = JsonLedgerStore::open(paths.clone())?;
        let history = JsonHistoryStore::new(paths.history());
        let sink = FanoutSink::new()
            .with(foreground)
            .with(OutboxAlertSink::new(paths.outbox()));
        info!(root = %paths.root().display(), "expense data opened");
        Ok(Self::new(
            Arc::new(store),
            Arc::new(history),
            Arc::new(sink),
            Arc::new(SystemClock),
            TrackerOptions::from_config(config),
        ))
    }

    pub fn notifier(&self) -> Arc<ThresholdNotifier> {
        Arc::clone(&self.notifier)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn budgets(&self) -> BudgetService<'_> {
        BudgetService::new(self.store.as_ref())
    }

    pub fn transactions(&self) -> TransactionService<'_> {
        TransactionService::new(self.store.as_ref())
    }

    pub fn check_thresholds(&self) -> Result<CheckReport, AppError> {
        Ok(self.notifier.check_thresholds()?)
    }

    pub fn on_budget_updated(&self, budget: &Budget) -> Result<CheckReport, AppError> {
        Ok(self.notifier.on_budget_updated(budget)?)
    }

    pub fn calculate_budget_spending(&self, budget: &Budget) -> Result<f64, AppError> {
        let transactions = self.store.all_transactions()?;
        Ok(self.evaluator.spent(budget, self.now(), &transactions))
    }

    pub fn calculate_budget_remaining(&self, budget: &Budget) -> Result<f64, AppError> {
        let transactions = self.store.all_transactions()?;
        Ok(self.evaluator.remaining(budget, self.now(), &transactions))
    }

    /// Usage clamped to `0..=100`, for progress display.
    pub fn calculate_budget_usage_percentage(&self, budget: &Budget) -> Result<u8, AppError> {
        let transactions = self.store.all_transactions()?;
        Ok(self.evaluator.usage_percent(budget, self.now(), &transactions))
    }

    /// Usage for every active budget, in stored order.
    pub fn budget_overview(&self) -> Result<Vec<BudgetUsage>, AppError> {
        let transactions = self.store.all_transactions()?;
        let now = self.now();
        Ok(self
            .budgets()
            .active()?
            .iter()
            .map(|budget| self.evaluator.evaluate(budget, now, &transactions))
            .collect())
    }

    pub fn aggregate_usage(&self) -> Result<Option<AggregateUsage>, AppError> {
        let transactions = self.store.all_transactions()?;
        let budgets = self.budgets().active()?;
        Ok(self.evaluator.aggregate(&budgets, self.now(), &transactions))
    }

    pub fn month_totals(&self) -> Result<MonthTotals, AppError> {
        Ok(self
            .transactions()
            .month_totals(self.evaluator.aggregator(), self.now())?)
    }

    pub fn add_budget(&self, budget: Budget) -> Result<Budget, AppError> {
        let budget = self.budgets().add(budget)?;
        self.after_budget_change(&budget);
        Ok(budget)
    }

    pub fn update_budget(&self, budget: Budget) -> Result<Budget, AppError> {
        let budget = self.budgets().update(budget)?;
        self.after_budget_change(&budget);
        Ok(budget)
    }

    pub fn deactivate_budget(&self, id: Uuid) -> Result<Budget, AppError> {
        let budget = self.budgets().deactivate(id)?;
        self.after_budget_change(&budget);
        Ok(budget)
    }

    pub fn delete_budget(&self, id: Uuid) -> Result<(), AppError> {
        self.budgets().delete(id)?;
        self.recheck("budget deleted");
        Ok(())
    }

    /// Records a transaction; expenses trigger a threshold check.
    pub fn add_transaction(&self, transaction: Transaction) -> Result<u64, AppError> {
        let is_expense = !transaction.is_income;
        let id = self.transactions().add(transaction)?;
        if is_expense {
            self.recheck("expense recorded");
        }
        Ok(id)
    }

    pub fn update_transaction(&self, transaction: Transaction) -> Result<(), AppError> {
        let is_expense = !transaction.is_income;
        self.transactions().update(transaction)?;
        if is_expense {
            self.recheck("expense updated");
        }
        Ok(())
    }

    pub fn delete_transaction(&self, id: u64) -> Result<(), AppError> {
        Ok(self.transactions().delete(id)?)
    }

    pub fn alerts_enabled(&self) -> bool {
        self.notifier.settings().alerts_enabled
    }

    pub fn set_alerts_enabled(&self, enabled: bool) {
        self.notifier.set_alerts_enabled(enabled);
        info!(enabled, "budget alerts toggled");
    }

    pub fn reminder_enabled(&self) -> bool {
        self.reminder_enabled.load(Ordering::SeqCst)
    }

    pub fn set_reminder_enabled(&self, enabled: bool) {
        self.reminder_enabled.store(enabled, Ordering::SeqCst);
        info!(enabled, "daily reminder toggled");
    }

    /// Sends today's reminder when enabled and not yet sent.
    pub fn send_reminder_if_due(&self) -> Result<bool, AppError> {
        Ok(self
            .notifier
            .send_reminder_if_due(self.reminder_enabled())?)
    }

    /// Wipes every budget and forgets alert history.
    pub fn reset_budgets(&self) -> Result<(), AppError> {
        self.budgets().clear_all()?;
        self.notifier.reset_history()?;
        info!("all budgets cleared");
        Ok(())
    }

    // A failed recheck must not undo a mutation that already succeeded.
    fn after_budget_change(&self, budget: &Budget) {
        match self.notifier.on_budget_updated(budget) {
            Ok(report) => debug!(raised = report.raised(), "post-update check finished"),
            Err(err) => warn!(error = %err, budget = %budget.id, "post-update check failed"),
        }
    }

    fn recheck(&self, reason: &str) {
        match self.notifier.check_thresholds() {
            Ok(report) => debug!(reason, raised = report.raised(), "threshold check finished"),
            Err(err) => warn!(reason, error = %err, "threshold check failed"),
        }
    }
}
