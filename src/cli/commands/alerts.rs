use xpense_core::SkipReason;

use crate::cli::commands::parse_toggle;
use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "check",
            "Run a budget threshold check now",
            "check",
            cmd_check,
        ),
        CommandEntry::new(
            "alerts",
            "Turn budget alerts on or off",
            "alerts on|off",
            cmd_alerts,
        ),
        CommandEntry::new(
            "reminder",
            "Turn the daily expense reminder on or off",
            "reminder on|off",
            cmd_reminder,
        ),
    ]
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let report = context.tracker.check_thresholds()?;
    match report.skipped {
        Some(SkipReason::NoActiveBudgets) => output::info("No active budgets to check."),
        Some(SkipReason::AlertsDisabled) => {
            output::info("Budget alerts are off. Use `alerts on` to enable them.")
        }
        None => {
            if report.aggregate_suppressed {
                output::hint("Overall budget alert already sent recently.");
            }
            for failure in &report.failures {
                output::warning(format!(
                    "Could not deliver `{}`: {}",
                    failure.alert.title(),
                    failure.reason
                ));
            }
            output::info(format!(
                "Checked {} budget(s); {} alert(s) raised.",
                report.budgets.len(),
                report.raised()
            ));
        }
    }
    Ok(())
}

fn cmd_alerts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let enabled = parse_toggle(args.first())?;
    context.tracker.set_alerts_enabled(enabled);
    context.config.budget_alerts_enabled = enabled;
    context.persist_config()?;
    output::success(format!(
        "Budget alerts {}.",
        if enabled { "enabled" } else { "disabled" }
    ));
    Ok(())
}

fn cmd_reminder(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let enabled = parse_toggle(args.first())?;
    context.tracker.set_reminder_enabled(enabled);
    context.config.daily_reminder_enabled = enabled;
    context.persist_config()?;
    output::success(format!(
        "Daily reminder {}.",
        if enabled { "enabled" } else { "disabled" }
    ));
    if enabled {
        context.tracker.send_reminder_if_due()?;
    }
    Ok(())
}
