use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use xpense_domain::{Alert, AlertKind, AlertScope, Budget, PeriodKind, Transaction};

use crate::{
    budget_service::BudgetService, notifier::*, reminder::ReminderService,
    storage::MemoryLedgerStore, time::FixedClock, transaction_service::TransactionService,
    BudgetEvaluator, CoreError, LedgerStore,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn now() -> NaiveDateTime {
    at(2024, 6, 15, 12)
}

struct Harness {
    store: Arc<MemoryLedgerStore>,
    history: Arc<MemoryHistoryStore>,
    sink: Arc<RecordingSink>,
    clock: Arc<FixedClock>,
    notifier: ThresholdNotifier,
}

fn harness_with(history: NotificationHistory, settings: NotifierSettings) -> Harness {
    harness_with_sink(history, settings, Arc::new(RecordingSink::new()))
}

fn harness_with_sink(
    history: NotificationHistory,
    settings: NotifierSettings,
    sink: Arc<RecordingSink>,
) -> Harness {
    let store = Arc::new(MemoryLedgerStore::new());
    let history = Arc::new(MemoryHistoryStore::new(history));
    let clock = Arc::new(FixedClock::new(now()));
    let notifier = ThresholdNotifier::new(
        store.clone(),
        history.clone(),
        sink.clone(),
        clock.clone(),
        BudgetEvaluator::default(),
        settings,
    );
    Harness {
        store,
        history,
        sink,
        clock,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(NotificationHistory::default(), NotifierSettings::default())
}

fn food_budget(amount: f64) -> Budget {
    Budget::new("Food", amount, PeriodKind::Monthly, at(2024, 6, 1, 9))
}

fn spend(store: &dyn LedgerStore, amount: f64, category: &str, when: NaiveDateTime) {
    TransactionService::new(store)
        .add(Transaction::expense("Purchase", amount, category, when))
        .expect("add transaction");
}

#[test]
fn duplicate_active_budget_is_rejected_but_other_period_allowed() {
    let store = MemoryLedgerStore::new();
    let service = BudgetService::new(&store);
    service.add(food_budget(200.0)).expect("first budget");

    let err = service
        .add(food_budget(300.0))
        .expect_err("duplicate should fail");
    assert!(matches!(err, CoreError::DuplicateBudget { .. }));
    assert!(err.is_rejection());

    let weekly = Budget::new("Food", 50.0, PeriodKind::Weekly, now());
    service.add(weekly).expect("weekly budget");
    assert_eq!(service.all().unwrap().len(), 2);
}

#[test]
fn deactivated_budget_frees_its_slot() {
    let store = MemoryLedgerStore::new();
    let service = BudgetService::new(&store);
    let first = service.add(food_budget(200.0)).unwrap();
    let inactive = service.deactivate(first.id).expect("deactivate");
    assert!(!inactive.is_active);
    service.add(food_budget(250.0)).expect("slot is free again");
    assert_eq!(service.active().unwrap().len(), 1);
}

#[test]
fn update_and_delete_report_unknown_budgets() {
    let store = MemoryLedgerStore::new();
    let service = BudgetService::new(&store);
    let ghost = food_budget(10.0);
    assert!(matches!(
        service.update(ghost.clone()),
        Err(CoreError::BudgetNotFound(id)) if id == ghost.id
    ));
    assert!(matches!(
        service.delete(ghost.id),
        Err(CoreError::BudgetNotFound(_))
    ));
}

#[test]
fn budget_validation_rejects_non_positive_amounts() {
    let store = MemoryLedgerStore::new();
    let service = BudgetService::new(&store);
    assert!(matches!(
        service.add(food_budget(0.0)),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        service.add(Budget::new("  ", 10.0, PeriodKind::Monthly, now())),
        Err(CoreError::Validation(_))
    ));
}

#[test]
fn budget_for_category_is_case_insensitive() {
    let store = MemoryLedgerStore::new();
    let service = BudgetService::new(&store);
    service.add(food_budget(200.0)).unwrap();
    let found = service.budget_for_category("fOoD").unwrap();
    assert_eq!(found.map(|b| b.category), Some("Food".to_string()));
}

#[test]
fn transaction_ids_are_monotonic() {
    let store = MemoryLedgerStore::new();
    let service = TransactionService::new(&store);
    let first = service
        .add(Transaction::expense("Coffee", 3.0, "Food", now()))
        .unwrap();
    let second = service
        .add(Transaction::expense("Tea", 2.0, "Food", now()))
        .unwrap();
    assert_eq!((first, second), (1, 2));

    service.delete(first).unwrap();
    let third = service
        .add(Transaction::expense("Cake", 4.0, "Food", now()))
        .unwrap();
    assert_eq!(third, 3);
    assert!(matches!(
        service.get(first),
        Err(CoreError::TransactionNotFound(1))
    ));
}

#[test]
fn transaction_update_replaces_whole_record() {
    let store = MemoryLedgerStore::new();
    let service = TransactionService::new(&store);
    let id = service
        .add(Transaction::expense("Coffee", 3.0, "Food", now()))
        .unwrap();
    let mut edited = service.get(id).unwrap();
    edited.amount = 4.5;
    edited.category = "Drinks".into();
    service.update(edited).unwrap();
    let stored = service.get(id).unwrap();
    assert_eq!(stored.amount, 4.5);
    assert_eq!(stored.category, "Drinks");
}

#[test]
fn out_of_range_day_window_is_rejected() {
    let store = MemoryLedgerStore::new();
    let service = TransactionService::new(&store);
    spend(&store, 5.0, "Food", now());
    for days in [999_999_999_999_999, i64::MAX, -1] {
        assert!(matches!(
            service.recent(now(), days),
            Err(CoreError::Validation(_))
        ));
    }
}

#[test]
fn memory_store_rejects_a_repeated_budget_id() {
    let store = MemoryLedgerStore::new();
    let budget = food_budget(100.0);
    store.insert_budget(budget.clone()).unwrap();
    assert!(matches!(
        store.insert_budget(budget),
        Err(CoreError::Storage(_))
    ));
    assert_eq!(store.all_budgets().unwrap().len(), 1);
}

#[test]
fn store_removals_report_missing_records() {
    let store = MemoryLedgerStore::new();
    let budget = food_budget(100.0);
    store.insert_budget(budget.clone()).unwrap();
    store.remove_budget(budget.id).unwrap();
    assert!(matches!(
        store.remove_budget(budget.id),
        Err(CoreError::BudgetNotFound(_))
    ));
    let id = store
        .insert_transaction(Transaction::expense("Tea", 2.0, "Food", now()))
        .unwrap();
    store.remove_transaction(id).unwrap();
    assert!(matches!(
        store.remove_transaction(id),
        Err(CoreError::TransactionNotFound(_))
    ));
}

#[test]
fn recent_transactions_respect_day_window() {
    let store = MemoryLedgerStore::new();
    let service = TransactionService::new(&store);
    spend(&store, 5.0, "Food", now() - Duration::days(3));
    spend(&store, 6.0, "Food", now() - Duration::days(10));
    assert_eq!(service.recent(now(), 7).unwrap().len(), 1);
    assert_eq!(service.recent(now(), 30).unwrap().len(), 2);
}

#[test]
fn check_without_active_budgets_is_a_no_op() {
    let h = harness();
    spend(h.store.as_ref(), 500.0, "Food", now());
    let report = h.notifier.check_thresholds().unwrap();
    assert_eq!(report.skipped, Some(SkipReason::NoActiveBudgets));
    assert!(h.sink.alerts().is_empty());
}

#[test]
fn disabled_alerts_skip_the_check() {
    let h = harness();
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 500.0, "Food", now());
    h.notifier.set_alerts_enabled(false);
    let report = h.notifier.check_thresholds().unwrap();
    assert_eq!(report.skipped, Some(SkipReason::AlertsDisabled));
    assert!(h.sink.alerts().is_empty());
    assert_eq!(h.history.load().unwrap().last_notified, None);
}

#[test]
fn exceeded_budget_alerts_with_raw_percent() {
    let h = harness();
    let budget = BudgetService::new(h.store.as_ref())
        .add(food_budget(200.0))
        .unwrap();
    for day in [2, 5, 9] {
        spend(h.store.as_ref(), 80.0, "Food", at(2024, 6, day, 18));
    }

    let evaluator = h.notifier.evaluator();
    let txns = h.store.all_transactions().unwrap();
    assert_eq!(evaluator.spent(&budget, now(), &txns), 240.0);
    assert_eq!(evaluator.usage_percent(&budget, now(), &txns), 100);
    assert_eq!(evaluator.remaining(&budget, now(), &txns), -40.0);

    let report = h.notifier.check_thresholds().unwrap();
    let alerts = h.sink.alerts();
    assert_eq!(alerts.len(), 2);
    let aggregate = report.aggregate_alert().expect("aggregate alert");
    assert_eq!(aggregate.kind, AlertKind::Exceeded);
    assert_eq!(aggregate.percent, 120);
    let per_budget = alerts
        .iter()
        .find(|alert| alert.scope == AlertScope::Category("Food".into()))
        .expect("category alert");
    assert_eq!(per_budget.kind, AlertKind::Exceeded);
    assert_eq!(per_budget.percent, 120);
    assert_eq!(report.budgets[0].display_percent, 100);
    assert_eq!(h.history.load().unwrap().last_notified, Some(now()));
}

#[test]
fn warning_fires_between_ninety_and_hundred_percent() {
    let h = harness();
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 92.0, "Food", at(2024, 6, 3, 10));

    h.notifier.check_thresholds().unwrap();
    let alerts = h.sink.alerts();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|alert| alert.kind == AlertKind::Warning));
    assert!(alerts.iter().all(|alert| alert.percent == 92));
}

#[test]
fn within_limit_still_consumes_forced_flag() {
    let history = NotificationHistory {
        last_notified: None,
        forced_check: true,
        last_reminder: None,
    };
    let h = harness_with(history, NotifierSettings::default());
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 10.0, "Food", at(2024, 6, 3, 10));

    let report = h.notifier.check_thresholds().unwrap();
    assert_eq!(report.raised(), 0);
    let stored = h.history.load().unwrap();
    assert!(!stored.forced_check);
    assert_eq!(stored.last_notified, None);
}

#[test]
fn aggregate_alert_is_suppressed_within_cooldown() {
    let history = NotificationHistory {
        last_notified: Some(now() - Duration::hours(2)),
        forced_check: false,
        last_reminder: None,
    };
    let h = harness_with(history.clone(), NotifierSettings::default());
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));

    let first = h.notifier.check_thresholds().unwrap();
    h.clock.advance(Duration::minutes(30));
    let second = h.notifier.check_thresholds().unwrap();

    for report in [&first, &second] {
        assert!(report.aggregate_suppressed);
        assert!(report.aggregate_alert().is_none());
    }
    assert_eq!(h.history.load().unwrap(), history);
    assert!(h
        .sink
        .alerts()
        .iter()
        .all(|alert| alert.scope != AlertScope::Aggregate));
}

#[test]
fn per_budget_alerts_repeat_every_tick_by_default() {
    let h = harness();
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));

    h.notifier.check_thresholds().unwrap();
    h.clock.advance(Duration::hours(1));
    h.notifier.check_thresholds().unwrap();

    let alerts = h.sink.alerts();
    let aggregate = alerts
        .iter()
        .filter(|alert| alert.scope == AlertScope::Aggregate)
        .count();
    let per_budget = alerts.len() - aggregate;
    assert_eq!(aggregate, 1);
    assert_eq!(per_budget, 2);
}

#[test]
fn per_budget_alerts_can_share_the_cooldown() {
    let settings = NotifierSettings {
        suppress_per_budget: true,
        ..NotifierSettings::default()
    };
    let h = harness_with(NotificationHistory::default(), settings);
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));

    h.notifier.check_thresholds().unwrap();
    h.clock.advance(Duration::hours(1));
    let second = h.notifier.check_thresholds().unwrap();

    assert_eq!(second.raised(), 0);
    assert_eq!(h.sink.alerts().len(), 2);
}

#[test]
fn cooldown_expires_after_a_day() {
    let h = harness();
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 95.0, "Food", at(2024, 6, 3, 10));

    assert!(h.notifier.check_thresholds().unwrap().aggregate_alert().is_some());
    h.clock.advance(Duration::hours(24));
    assert!(h.notifier.check_thresholds().unwrap().aggregate_alert().is_none());
    h.clock.advance(Duration::hours(1));
    assert!(h.notifier.check_thresholds().unwrap().aggregate_alert().is_some());
}

#[test]
fn budget_update_forces_immediate_recheck() {
    let history = NotificationHistory {
        last_notified: Some(now() - Duration::minutes(5)),
        forced_check: false,
        last_reminder: None,
    };
    let h = harness_with(history, NotifierSettings::default());
    let service = BudgetService::new(h.store.as_ref());
    let budget = service.add(food_budget(300.0)).unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));

    let quiet = h.notifier.check_thresholds().unwrap();
    assert!(quiet.aggregate_alert().is_none());

    let mut lowered = budget.clone();
    lowered.amount = 120.0;
    let lowered = service.update(lowered).unwrap();
    let report = h.notifier.on_budget_updated(&lowered).unwrap();

    let alert = report.aggregate_alert().expect("forced aggregate alert");
    assert_eq!(alert.kind, AlertKind::Exceeded);
    assert_eq!(alert.percent, 125);
    assert_eq!(h.sink.dismissals(), 1);
    let stored = h.history.load().unwrap();
    assert!(!stored.forced_check);
    assert_eq!(stored.last_notified, Some(now()));
}

#[test]
fn delivery_failures_do_not_abort_the_cycle() {
    let h = harness_with_sink(
        NotificationHistory::default(),
        NotifierSettings::default(),
        Arc::new(RecordingSink::denying()),
    );
    let service = BudgetService::new(h.store.as_ref());
    service.add(food_budget(100.0)).unwrap();
    service
        .add(Budget::new("Transport", 50.0, PeriodKind::Monthly, now()))
        .unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));
    spend(h.store.as_ref(), 60.0, "Transport", at(2024, 6, 4, 10));

    let report = h.notifier.check_thresholds().unwrap();
    assert!(report.emitted.is_empty());
    assert_eq!(report.failures.len(), 3);
    assert_eq!(report.budgets.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|failure| failure.reason.contains("Permission denied")));
    assert_eq!(h.history.load().unwrap().last_notified, Some(now()));
}

#[test]
fn concurrent_checks_emit_a_single_aggregate_alert() {
    let h = harness();
    BudgetService::new(h.store.as_ref())
        .add(food_budget(100.0))
        .unwrap();
    spend(h.store.as_ref(), 150.0, "Food", at(2024, 6, 3, 10));

    let notifier = Arc::new(h.notifier);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || notifier.check_thresholds().expect("check"))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let aggregate = h
        .sink
        .alerts()
        .iter()
        .filter(|alert| alert.scope == AlertScope::Aggregate)
        .count();
    assert_eq!(aggregate, 1);
}

#[test]
fn reminder_is_sent_once_per_day() {
    let history = MemoryHistoryStore::default();
    let sink = RecordingSink::new();
    let clock = FixedClock::new(now());
    let reminders = ReminderService::new(&history, &sink, &clock);

    assert!(!reminders.send_if_due(false).unwrap());
    assert!(reminders.send_if_due(true).unwrap());
    assert!(!reminders.send_if_due(true).unwrap());
    clock.advance(Duration::days(1));
    assert!(reminders.send_if_due(true).unwrap());
    assert_eq!(sink.alerts().len(), 2);
    assert!(sink
        .alerts()
        .iter()
        .all(|alert| alert.kind == AlertKind::Reminder));
}

/// Signals when a reminder delivery starts, then holds it for a while.
struct SlowReminderSink {
    inner: RecordingSink,
    started: Mutex<Option<mpsc::Sender<()>>>,
}

impl AlertSink for SlowReminderSink {
    fn emit(&self, alert: &Alert) -> Result<(), DeliveryError> {
        if alert.kind == AlertKind::Reminder {
            if let Some(started) = self.started.lock().unwrap().take() {
                started.send(()).unwrap();
            }
            thread::sleep(StdDuration::from_millis(200));
        }
        self.inner.emit(alert)
    }

    fn dismiss_aggregate(&self) -> Result<(), DeliveryError> {
        self.inner.dismiss_aggregate()
    }
}

#[test]
fn reminder_in_flight_does_not_undo_a_budget_recheck() {
    let store = Arc::new(MemoryLedgerStore::new());
    let history = Arc::new(MemoryHistoryStore::default());
    let clock = Arc::new(FixedClock::new(now()));
    let (started_tx, started_rx) = mpsc::channel();
    let sink = Arc::new(SlowReminderSink {
        inner: RecordingSink::new(),
        started: Mutex::new(Some(started_tx)),
    });
    let notifier = Arc::new(ThresholdNotifier::new(
        store.clone(),
        history.clone(),
        sink.clone(),
        clock.clone(),
        BudgetEvaluator::default(),
        NotifierSettings::default(),
    ));
    let budget = BudgetService::new(store.as_ref())
        .add(food_budget(200.0))
        .unwrap();
    spend(store.as_ref(), 240.0, "Food", at(2024, 6, 3, 10));

    let reminder = {
        let notifier = Arc::clone(&notifier);
        thread::spawn(move || notifier.send_reminder_if_due(true).expect("reminder"))
    };
    started_rx.recv().expect("reminder started");
    notifier.on_budget_updated(&budget).unwrap();
    assert!(reminder.join().expect("thread"));

    clock.advance(Duration::minutes(5));
    notifier.check_thresholds().unwrap();

    let aggregate = sink
        .inner
        .alerts()
        .iter()
        .filter(|alert| alert.scope == AlertScope::Aggregate && alert.kind != AlertKind::Reminder)
        .count();
    assert_eq!(aggregate, 1);
    let saved = history.load().unwrap();
    assert_eq!(saved.last_notified, Some(now()));
    assert_eq!(saved.last_reminder, Some(now().date()));
}
