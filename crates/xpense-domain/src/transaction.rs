//! Domain models for income and expense transactions.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::common::*;

pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

pub const PAYMENT_METHODS: &[&str] = &[
    "Cash",
    "Credit Card",
    "Debit Card",
    "Bank Transfer",
    "Mobile Payment",
];

/// A single recorded movement of money. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub recurrence: RecurrenceTag,
}

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.into()
}

impl Transaction {
    pub fn expense(
        title: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            amount,
            category: category.into(),
            description: String::new(),
            timestamp,
            is_income: false,
            payment_method: default_payment_method(),
            recurrence: RecurrenceTag::None,
        }
    }

    pub fn income(
        title: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            is_income: true,
            ..Self::expense(title, amount, category, timestamp)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceTag) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Signed value: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        if self.is_income {
            self.amount
        } else {
            -self.amount
        }
    }

    pub fn formatted_amount(&self) -> String {
        if self.is_income {
            format!("+${:.2}", self.amount)
        } else {
            format!("-${:.2}", self.amount)
        }
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "#{} {} {} [{}] {}",
            self.id,
            self.timestamp.format("%d %b %Y"),
            self.title,
            self.category,
            self.formatted_amount()
        )
    }
}

/// Informational recurrence marker; the engine never expands it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RecurrenceTag {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceTag {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => RecurrenceTag::Daily,
            "weekly" => RecurrenceTag::Weekly,
            "monthly" => RecurrenceTag::Monthly,
            _ => RecurrenceTag::None,
        }
    }
}

impl fmt::Display for RecurrenceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceTag::None => "None",
            RecurrenceTag::Daily => "Daily",
            RecurrenceTag::Weekly => "Weekly",
            RecurrenceTag::Monthly => "Monthly",
        };
        f.write_str(label)
    }
}
