//! Derives spent / remaining / usage figures for budgets.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xpense_domain::{Budget, BudgetStatus, PeriodKind, Transaction};

use crate::SpendingAggregator;

/// Percentages at which a budget counts as nearly used up or over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: u8,
    pub exceeded: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 90,
            exceeded: 100,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, raw_percent: i64) -> BudgetStatus {
        BudgetStatus::classify(raw_percent, self.warning, self.exceeded)
    }
}

/// Evaluation of a single budget against its own period window.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUsage {
    pub budget_id: Uuid,
    pub category: String,
    pub period: PeriodKind,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    /// Unclamped; used for threshold comparisons and alert text.
    pub raw_percent: i64,
    /// Clamped to `0..=100`; used for progress display.
    pub display_percent: u8,
    pub status: BudgetStatus,
}

/// Sum of every active budget compared with all current-month expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateUsage {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_percent: i64,
    pub status: BudgetStatus,
}

/// Unclamped `spent / limit` as a rounded percentage. A non-positive limit
/// counts as fully used.
pub fn raw_percent(spent: f64, limit: f64) -> i64 {
    if limit > 0.0 {
        (spent / limit * 100.0).round() as i64
    } else {
        100
    }
}

pub fn display_percent(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetEvaluator {
    aggregator: SpendingAggregator,
    thresholds: Thresholds,
}

impl BudgetEvaluator {
    pub fn new(aggregator: SpendingAggregator, thresholds: Thresholds) -> Self {
        Self {
            aggregator,
            thresholds,
        }
    }

    pub fn aggregator(&self) -> &SpendingAggregator {
        &self.aggregator
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn spent(&self, budget: &Budget, now: NaiveDateTime, transactions: &[Transaction]) -> f64 {
        self.aggregator
            .sum(&budget.category, budget.period, now, transactions)
    }

    /// May be negative once the budget is overspent.
    pub fn remaining(&self, budget: &Budget, now: NaiveDateTime, transactions: &[Transaction]) -> f64 {
        budget.amount - self.spent(budget, now, transactions)
    }

    pub fn usage_percent(
        &self,
        budget: &Budget,
        now: NaiveDateTime,
        transactions: &[Transaction],
    ) -> u8 {
        if budget.amount <= 0.0 {
            return 100;
        }
        display_percent(raw_percent(
            self.spent(budget, now, transactions),
            budget.amount,
        ))
    }

    pub fn evaluate(
        &self,
        budget: &Budget,
        now: NaiveDateTime,
        transactions: &[Transaction],
    ) -> BudgetUsage {
        let spent = self.spent(budget, now, transactions);
        let raw = raw_percent(spent, budget.amount);
        BudgetUsage {
            budget_id: budget.id,
            category: budget.category.clone(),
            period: budget.period,
            limit: budget.amount,
            spent,
            remaining: budget.amount - spent,
            raw_percent: raw,
            display_percent: display_percent(raw),
            status: self.thresholds.classify(raw),
        }
    }

    /// Aggregate check across active budgets. Spending is every expense in the
    /// current calendar month, whatever each budget's own period is.
    /// `None` when the summed budget is not positive.
    pub fn aggregate(
        &self,
        budgets: &[Budget],
        now: NaiveDateTime,
        transactions: &[Transaction],
    ) -> Option<AggregateUsage> {
        let total_budget: f64 = budgets
            .iter()
            .filter(|budget| budget.is_active)
            .map(|budget| budget.amount)
            .sum();
        if total_budget <= 0.0 {
            return None;
        }
        let month = self.aggregator.resolver().month_of(now);
        let total_spent = self.aggregator.expense_in_window(&month, transactions);
        let total_percent = raw_percent(total_spent, total_budget);
        Some(AggregateUsage {
            total_budget,
            total_spent,
            total_percent,
            status: self.thresholds.classify(total_percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn food_budget(amount: f64) -> Budget {
        Budget::new("Food", amount, PeriodKind::Monthly, at(2024, 1, 1))
    }

    #[test]
    fn overspent_budget_clamps_display_but_not_remaining() {
        let budget = food_budget(100.0);
        let transactions = vec![Transaction::expense("Feast", 150.0, "Food", at(2024, 6, 2))];
        let evaluator = BudgetEvaluator::default();
        let now = at(2024, 6, 10);

        assert_eq!(evaluator.usage_percent(&budget, now, &transactions), 100);
        assert_eq!(evaluator.remaining(&budget, now, &transactions), -50.0);
        let usage = evaluator.evaluate(&budget, now, &transactions);
        assert_eq!(usage.raw_percent, 150);
        assert_eq!(usage.display_percent, 100);
        assert_eq!(usage.status, BudgetStatus::Exceeded);
    }

    #[test]
    fn zero_budget_is_always_fully_used() {
        let budget = food_budget(0.0);
        let evaluator = BudgetEvaluator::default();
        let now = at(2024, 6, 10);
        assert_eq!(evaluator.usage_percent(&budget, now, &[]), 100);
        let spent = vec![Transaction::expense("Snack", 3.0, "Food", at(2024, 6, 2))];
        assert_eq!(evaluator.usage_percent(&budget, now, &spent), 100);
    }

    #[test]
    fn usage_percent_rounds_to_nearest() {
        let budget = food_budget(300.0);
        let transactions = vec![Transaction::expense("Shop", 100.0, "Food", at(2024, 6, 2))];
        let usage = BudgetEvaluator::default().evaluate(&budget, at(2024, 6, 10), &transactions);
        assert_eq!(usage.raw_percent, 33);
        assert_eq!(usage.status, BudgetStatus::WithinLimit);
    }

    #[test]
    fn aggregate_uses_all_current_month_expenses() {
        let weekly = Budget::new("Transport", 100.0, PeriodKind::Weekly, at(2024, 1, 1));
        let budgets = vec![food_budget(100.0), weekly];
        let transactions = vec![
            Transaction::expense("Groceries", 90.0, "Food", at(2024, 6, 1)),
            Transaction::expense("Gift", 90.0, "Shopping", at(2024, 6, 20)),
            Transaction::expense("Last month", 500.0, "Food", at(2024, 5, 31)),
            Transaction::income("Salary", 900.0, "Salary", at(2024, 6, 1)),
        ];
        let aggregate = BudgetEvaluator::default()
            .aggregate(&budgets, at(2024, 6, 25), &transactions)
            .expect("positive total");
        assert_eq!(aggregate.total_budget, 200.0);
        assert_eq!(aggregate.total_spent, 180.0);
        assert_eq!(aggregate.total_percent, 90);
        assert_eq!(aggregate.status, BudgetStatus::Warning);
    }

    #[test]
    fn aggregate_skipped_without_positive_total() {
        let budgets = vec![food_budget(0.0)];
        assert!(BudgetEvaluator::default()
            .aggregate(&budgets, at(2024, 6, 25), &[])
            .is_none());
    }
}
