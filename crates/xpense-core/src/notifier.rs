//! Threshold checks over active budgets, with once-per-cooldown suppression
//! of the aggregate alert and a one-shot forced recheck after budget edits.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use xpense_domain::{Alert, AlertScope, Budget, PeriodKind};

use crate::{
    AggregateUsage, BudgetEvaluator, BudgetUsage, Clock, CoreError, LedgerStore, ReminderService,
    Thresholds,
};

/// Persisted record of when the aggregate alert last fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationHistory {
    /// `None` means "never", which always allows the next aggregate alert.
    #[serde(default)]
    pub last_notified: Option<NaiveDateTime>,
    #[serde(default)]
    pub forced_check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminder: Option<NaiveDate>,
}

impl NotificationHistory {
    /// Forgets the last aggregate alert and arms a forced recheck.
    pub fn reset(&mut self) {
        self.last_notified = None;
        self.forced_check = true;
    }

    pub fn should_notify(&self, now: NaiveDateTime, cooldown: Duration) -> bool {
        match self.last_notified {
            _ if self.forced_check => true,
            None => true,
            Some(last) => now - last > cooldown,
        }
    }
}

/// Storage for [`NotificationHistory`], injected into the notifier.
pub trait NotificationHistoryStore: Send + Sync {
    fn load(&self) -> Result<NotificationHistory, CoreError>;
    fn save(&self, history: &NotificationHistory) -> Result<(), CoreError>;

    fn reset(&self) -> Result<(), CoreError> {
        let mut history = self.load()?;
        history.reset();
        self.save(&history)
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    state: Mutex<NotificationHistory>,
}

impl MemoryHistoryStore {
    pub fn new(history: NotificationHistory) -> Self {
        Self {
            state: Mutex::new(history),
        }
    }
}

impl NotificationHistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<NotificationHistory, CoreError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| CoreError::Storage("notification history lock poisoned".into()))
    }

    fn save(&self, history: &NotificationHistory) -> Result<(), CoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::Storage("notification history lock poisoned".into()))?;
        *state = history.clone();
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Permission denied for sending notification")]
    PermissionDenied,
    #[error("Alert channel unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivery channel for alerts. The notifier only ever talks to this trait.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError>;

    /// Withdraws any aggregate alert still on display.
    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}

impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        (**self).emit(alert)
    }

    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        (**self).dismiss_aggregate()
    }
}

/// Sends every alert to each inner sink. One failing sink does not stop the
/// others; the first failure is returned after all were tried.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl AlertSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AlertSink for FanoutSink {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.emit(alert) {
                warn!(error = %err, "alert sink rejected delivery");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.dismiss_aggregate() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// In-process sink that keeps every delivered alert; optionally refuses delivery.
#[derive(Debug, Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
    dismissals: Mutex<usize>,
    deny: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every alert with [`DeliveryError::PermissionDenied`].
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }

    pub fn dismissals(&self) -> usize {
        self.dismissals.lock().map(|count| *count).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.clear();
        }
    }
}

impl AlertSink for RecordingSink {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        if self.deny {
            return Err(DeliveryError::PermissionDenied);
        }
        self.alerts
            .lock()
            .map_err(|_| DeliveryError::Unavailable("recording sink poisoned".into()))?
            .push(alert.clone());
        Ok(())
    }

    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        let mut count = self
            .dismissals
            .lock()
            .map_err(|_| DeliveryError::Unavailable("recording sink poisoned".into()))?;
        *count += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierSettings {
    pub alerts_enabled: bool,
    pub thresholds: Thresholds,
    /// Minimum gap between two aggregate alerts unless a recheck is forced.
    pub cooldown: Duration,
    /// Apply the aggregate cooldown to per-budget alerts as well.
    pub suppress_per_budget: bool,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            thresholds: Thresholds::default(),
            cooldown: Duration::days(1),
            suppress_per_budget: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoActiveBudgets,
    AlertsDisabled,
}

#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub alert: Alert,
    pub reason: String,
}

/// Outcome of one threshold check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub checked_at: NaiveDateTime,
    pub skipped: Option<SkipReason>,
    pub aggregate: Option<AggregateUsage>,
    /// The aggregate was evaluated but the cooldown kept it quiet.
    pub aggregate_suppressed: bool,
    pub budgets: Vec<BudgetUsage>,
    pub emitted: Vec<Alert>,
    pub failures: Vec<DeliveryFailure>,
}

impl CheckReport {
    fn new(checked_at: NaiveDateTime) -> Self {
        Self {
            checked_at,
            skipped: None,
            aggregate: None,
            aggregate_suppressed: false,
            budgets: Vec::new(),
            emitted: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn skipped(checked_at: NaiveDateTime, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::new(checked_at)
        }
    }

    /// Alerts that were raised, whether or not delivery succeeded.
    pub fn raised(&self) -> usize {
        self.emitted.len() + self.failures.len()
    }

    pub fn aggregate_alert(&self) -> Option<&Alert> {
        self.emitted
            .iter()
            .chain(self.failures.iter().map(|failure| &failure.alert))
            .find(|alert| alert.scope == AlertScope::Aggregate)
    }
}

/// Evaluates active budgets and raises warning / exceeded alerts.
pub struct ThresholdNotifier {
    store: Arc<dyn LedgerStore>,
    history: Arc<dyn NotificationHistoryStore>,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    evaluator: BudgetEvaluator,
    settings: RwLock<NotifierSettings>,
    gate: Mutex<()>,
}

impl ThresholdNotifier {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        history: Arc<dyn NotificationHistoryStore>,
        sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        evaluator: BudgetEvaluator,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            store,
            history,
            sink,
            clock,
            evaluator,
            settings: RwLock::new(settings),
            gate: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> NotifierSettings {
        self.settings
            .read()
            .map(|settings| *settings)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    pub fn set_alerts_enabled(&self, enabled: bool) {
        let mut settings = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        settings.alerts_enabled = enabled;
    }

    pub fn evaluator(&self) -> &BudgetEvaluator {
        &self.evaluator
    }

    pub fn history(&self) -> Result<NotificationHistory, CoreError> {
        self.history.load()
    }

    /// Runs one check cycle. Concurrent calls are serialized.
    pub fn check_thresholds(&self) -> Result<CheckReport, CoreError> {
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.check_locked()
    }

    /// Sends today's reminder when due. Shares the check gate, since the
    /// reminder date lives in the same history record as the cooldown.
    pub fn send_reminder_if_due(&self, enabled: bool) -> Result<bool, CoreError> {
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ReminderService::new(self.history.as_ref(), self.sink.as_ref(), self.clock.as_ref())
            .send_if_due(enabled)
    }

    /// Forgets the last aggregate alert and arms a forced recheck without
    /// running one.
    pub fn reset_history(&self) -> Result<(), CoreError> {
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.history.reset()
    }

    /// Invalidates the notification history after a budget was created or
    /// edited, withdraws shown aggregate alerts, then rechecks immediately.
    pub fn on_budget_updated(&self, budget: &Budget) -> Result<CheckReport, CoreError> {
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        info!(budget = %budget.id, category = %budget.category, "budget changed; forcing threshold recheck");
        self.history.reset()?;
        if let Err(err) = self.sink.dismiss_aggregate() {
            warn!(error = %err, "failed to withdraw previous aggregate alert");
        }
        self.check_locked()
    }

    fn check_locked(&self) -> Result<CheckReport, CoreError> {
        let settings = self.settings();
        let now = self.clock.now();

        let budgets: Vec<Budget> = self
            .store
            .all_budgets()?
            .into_iter()
            .filter(|budget| budget.is_active)
            .collect();
        debug!(count = budgets.len(), "checking active budgets");
        if budgets.is_empty() {
            debug!("no active budgets found");
            return Ok(CheckReport::skipped(now, SkipReason::NoActiveBudgets));
        }
        if !settings.alerts_enabled {
            debug!("budget alerts are disabled");
            return Ok(CheckReport::skipped(now, SkipReason::AlertsDisabled));
        }

        let transactions = self.store.all_transactions()?;
        let mut report = CheckReport::new(now);
        let mut history = self.history.load()?;
        let window_open = history.should_notify(now, settings.cooldown);

        if let Some(aggregate) = self.evaluator.aggregate(&budgets, now, &transactions) {
            debug!(
                forced = history.forced_check,
                last_notified = ?history.last_notified,
                percent = aggregate.total_percent,
                "aggregate usage computed"
            );
            if window_open {
                match aggregate.status.alert_kind() {
                    Some(kind) => {
                        let alert = Alert::threshold(
                            kind,
                            AlertScope::Aggregate,
                            aggregate.total_spent,
                            aggregate.total_budget,
                            aggregate.total_percent,
                            PeriodKind::Monthly,
                        );
                        self.deliver(alert, &mut report);
                        history.last_notified = Some(now);
                    }
                    None => debug!(percent = aggregate.total_percent, "budget within limits"),
                }
                history.forced_check = false;
                self.history.save(&history)?;
            } else {
                debug!("skipping aggregate alert due to cooldown");
                report.aggregate_suppressed = true;
            }
            report.aggregate = Some(aggregate);
        }

        let per_budget_open = window_open || !settings.suppress_per_budget;
        for budget in &budgets {
            let usage = self.evaluator.evaluate(budget, now, &transactions);
            debug!(
                category = %usage.category,
                spent = usage.spent,
                limit = usage.limit,
                percent = usage.raw_percent,
                "budget evaluated"
            );
            if per_budget_open {
                if let Some(kind) = usage.status.alert_kind() {
                    let alert = Alert::threshold(
                        kind,
                        AlertScope::Category(usage.category.clone()),
                        usage.spent,
                        usage.limit,
                        usage.raw_percent,
                        usage.period,
                    );
                    self.deliver(alert, &mut report);
                }
            }
            report.budgets.push(usage);
        }

        Ok(report)
    }

    fn deliver(&self, alert: Alert, report: &mut CheckReport) {
        match self.sink.emit(&alert) {
            Ok(()) => {
                info!(scope = %alert.scope, percent = alert.percent, "{}", alert.title());
                report.emitted.push(alert);
            }
            Err(err) => {
                warn!(scope = %alert.scope, error = %err, "alert delivery failed");
                report.failures.push(DeliveryFailure {
                    alert,
                    reason: err.to_string(),
                });
            }
        }
    }
}
