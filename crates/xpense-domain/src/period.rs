//! Budget accounting periods and the windows they resolve to.

use std::fmt;

use chrono::{NaiveDateTime, Weekday};
use serde::{de::Deserializer, Deserialize, Serialize};

/// Enumerates the cadences a budget can be tracked over.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    #[default]
    Monthly,
    Weekly,
    Yearly,
}

impl PeriodKind {
    /// Parses a period label case-insensitively. Anything unrecognized is monthly.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => PeriodKind::Weekly,
            "yearly" => PeriodKind::Yearly,
            _ => PeriodKind::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodKind::Monthly => "monthly",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PeriodKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|raw| PeriodKind::parse(&raw))
            .unwrap_or_default())
    }
}

/// First day of the week used when resolving weekly windows.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// Inclusive `[start, end]` range of instants a budget is aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PeriodWindow {
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}
