//! Sums transaction amounts over period windows.

use chrono::NaiveDateTime;
use xpense_domain::{same_category, PeriodKind, PeriodWindow, Transaction};

use crate::PeriodResolver;

/// Income, expense and balance for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpendingAggregator {
    resolver: PeriodResolver,
}

impl SpendingAggregator {
    pub fn new(resolver: PeriodResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    /// Total expenses recorded under `category` inside the period window that
    /// contains `reference`. Income never counts; 0 when nothing matches.
    pub fn sum(
        &self,
        category: &str,
        period: PeriodKind,
        reference: NaiveDateTime,
        transactions: &[Transaction],
    ) -> f64 {
        let window = self.resolver.resolve(period, reference);
        transactions
            .iter()
            .filter(|txn| !txn.is_income)
            .filter(|txn| same_category(&txn.category, category))
            .filter(|txn| window.contains(txn.timestamp))
            .map(|txn| txn.amount)
            .sum()
    }

    /// Total expenses in `window`, across every category.
    pub fn expense_in_window(&self, window: &PeriodWindow, transactions: &[Transaction]) -> f64 {
        transactions
            .iter()
            .filter(|txn| !txn.is_income && window.contains(txn.timestamp))
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn month_totals(&self, reference: NaiveDateTime, transactions: &[Transaction]) -> MonthTotals {
        let window = self.resolver.month_of(reference);
        let (income, expense) = transactions
            .iter()
            .filter(|txn| window.contains(txn.timestamp))
            .fold((0.0, 0.0), |(income, expense), txn| {
                if txn.is_income {
                    (income + txn.amount, expense)
                } else {
                    (income, expense + txn.amount)
                }
            });
        MonthTotals {
            income,
            expense,
            balance: income - expense,
        }
    }
}
