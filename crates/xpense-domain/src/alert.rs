//! Alert payloads produced by threshold checks and reminders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{common::format_money, period::PeriodKind};

/// Where a usage figure sits relative to the warning and exceeded thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetStatus {
    WithinLimit,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    /// Classifies an unclamped percentage. `exceeded` wins when both thresholds match.
    pub fn classify(raw_percent: i64, warning: u8, exceeded: u8) -> Self {
        if raw_percent >= i64::from(exceeded) {
            BudgetStatus::Exceeded
        } else if raw_percent >= i64::from(warning) {
            BudgetStatus::Warning
        } else {
            BudgetStatus::WithinLimit
        }
    }

    pub fn alert_kind(self) -> Option<AlertKind> {
        match self {
            BudgetStatus::WithinLimit => None,
            BudgetStatus::Warning => Some(AlertKind::Warning),
            BudgetStatus::Exceeded => Some(AlertKind::Exceeded),
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::WithinLimit => "Within limit",
            BudgetStatus::Warning => "Warning",
            BudgetStatus::Exceeded => "Exceeded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertKind {
    Warning,
    Exceeded,
    Reminder,
}

/// What an alert is about: the sum of all active budgets, or one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertScope {
    Aggregate,
    Category(String),
}

impl fmt::Display for AlertScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertScope::Aggregate => f.write_str("all budgets"),
            AlertScope::Category(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub scope: AlertScope,
    pub spent: f64,
    pub limit: f64,
    /// Unclamped usage percentage.
    pub percent: i64,
    #[serde(default)]
    pub period: PeriodKind,
}

impl Alert {
    pub fn threshold(
        kind: AlertKind,
        scope: AlertScope,
        spent: f64,
        limit: f64,
        percent: i64,
        period: PeriodKind,
    ) -> Self {
        Self {
            kind,
            scope,
            spent,
            limit,
            percent,
            period,
        }
    }

    pub fn reminder() -> Self {
        Self {
            kind: AlertKind::Reminder,
            scope: AlertScope::Aggregate,
            spent: 0.0,
            limit: 0.0,
            percent: 0,
            period: PeriodKind::Monthly,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    pub fn title(&self) -> String {
        match (&self.kind, &self.scope) {
            (AlertKind::Exceeded, AlertScope::Aggregate) => {
                format!("{} Budget Exceeded!", capitalize(self.period.label()))
            }
            (AlertKind::Exceeded, AlertScope::Category(name)) => {
                format!("{name} Budget Exceeded!")
            }
            (AlertKind::Warning, AlertScope::Aggregate) => "Budget Warning".into(),
            (AlertKind::Warning, AlertScope::Category(name)) => format!("{name} Budget Warning"),
            (AlertKind::Reminder, _) => "Daily Expense Reminder".into(),
        }
    }

    pub fn message(&self) -> String {
        let budget_label = match &self.scope {
            AlertScope::Aggregate => format!("{} budget", self.period),
            AlertScope::Category(name) => format!("{} {} budget", self.period, name),
        };
        match self.kind {
            AlertKind::Exceeded => format!(
                "You've spent {} of your {} {} ({}%)",
                format_money(self.spent),
                format_money(self.limit),
                budget_label,
                self.percent
            ),
            AlertKind::Warning => format!(
                "You've used {}% of your {}. {} remaining.",
                self.percent,
                budget_label,
                format_money(self.remaining())
            ),
            AlertKind::Reminder => "Don't forget to record your expenses for today!".into(),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
