//! Spending ceilings assigned to a category over a period.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, period::PeriodKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub period: PeriodKind,
    pub created_at: NaiveDateTime,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        period: PeriodKind,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            amount,
            period,
            created_at,
            is_active: true,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True when this budget occupies the same active (category, period) slot.
    pub fn conflicts_with(&self, other: &Budget) -> bool {
        self.is_active
            && other.is_active
            && self.id != other.id
            && self.category == other.category
            && self.period == other.period
    }
}

impl Amounted for Budget {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Budget {
    fn display_label(&self) -> String {
        let state = if self.is_active { "" } else { " (inactive)" };
        format!(
            "{} {} {}{}",
            self.category,
            self.period,
            format_money(self.amount),
            state
        )
    }
}
