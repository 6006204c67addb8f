pub mod alerts;
pub mod budget;
pub mod system;
pub mod transaction;

use chrono::{NaiveDate, NaiveDateTime};
use xpense_domain::Budget;

use crate::cli::context::{CommandError, ShellContext};
use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(transaction::definitions());
    commands.extend(budget::definitions());
    commands.extend(alerts::definitions());
    commands
}

pub(crate) fn require<'a>(args: &[&'a str], index: usize, name: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("missing <{name}>")))
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned = input.trim().trim_start_matches('$');
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid amount `{input}`"
        ))),
    }
}

/// Accepts `YYYY-MM-DD` (noon that day) or `YYYY-MM-DD HH:MM`.
pub(crate) fn parse_timestamp(input: &str) -> Result<NaiveDateTime, CommandError> {
    let input = input.trim();
    if let Ok(stamp) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(stamp);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "invalid date `{input}` (use YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")"
            ))
        })
}

pub(crate) fn parse_toggle(input: Option<&&str>) -> Result<bool, CommandError> {
    match input.map(|value| value.to_ascii_lowercase()).as_deref() {
        Some("on" | "true" | "yes") => Ok(true),
        Some("off" | "false" | "no") => Ok(false),
        _ => Err(CommandError::InvalidArguments(
            "expected `on` or `off`".into(),
        )),
    }
}

pub(crate) fn short_id(budget: &Budget) -> String {
    let mut short = budget.id.simple().to_string();
    short.truncate(8);
    short
}

/// Finds a budget by id prefix (at least four characters), falling back to an
/// active budget whose category matches.
pub(crate) fn resolve_budget(context: &ShellContext, reference: &str) -> Result<Budget, CommandError> {
    let needle = reference.trim().to_ascii_lowercase();
    let budgets = context.tracker.budgets().all()?;
    if needle.len() >= 4 {
        let matches: Vec<&Budget> = budgets
            .iter()
            .filter(|budget| budget.id.simple().to_string().starts_with(&needle))
            .collect();
        match matches.as_slice() {
            [only] => return Ok((*only).clone()),
            [] => {}
            _ => {
                return Err(CommandError::InvalidArguments(format!(
                    "`{reference}` matches more than one budget"
                )))
            }
        }
    }
    context
        .tracker
        .budgets()
        .budget_for_category(reference)?
        .ok_or_else(|| CommandError::InvalidArguments(format!("no budget matches `{reference}`")))
}
