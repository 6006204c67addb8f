use xpense_core::BudgetUsage;
use xpense_domain::{canonical_category, format_money, Budget, BudgetStatus, PeriodKind};

use crate::cli::commands::{parse_amount, require, resolve_budget, short_id};
use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add-budget",
            "Create a budget for a category",
            "add-budget <category> <amount> [monthly|weekly|yearly] [notes]",
            cmd_add_budget,
        ),
        CommandEntry::new(
            "edit-budget",
            "Change a budget's amount or period",
            "edit-budget <id|category> <amount> [monthly|weekly|yearly]",
            cmd_edit_budget,
        ),
        CommandEntry::new(
            "deactivate-budget",
            "Stop tracking a budget without deleting it",
            "deactivate-budget <id|category>",
            cmd_deactivate_budget,
        ),
        CommandEntry::new(
            "delete-budget",
            "Delete a budget",
            "delete-budget <id|category>",
            cmd_delete_budget,
        ),
        CommandEntry::new("budgets", "List budgets", "budgets", cmd_budgets),
        CommandEntry::new(
            "status",
            "Show spending against active budgets",
            "status",
            cmd_status,
        ),
    ]
}

fn cmd_add_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category = require(args, 0, "category")?;
    let category = canonical_category(category, false).unwrap_or(category);
    let amount = parse_amount(require(args, 1, "amount")?)?;
    let period = args.get(2).map(|raw| PeriodKind::parse(raw)).unwrap_or_default();
    let mut budget = Budget::new(category, amount, period, context.tracker.now());
    if let Some(notes) = args.get(3) {
        budget = budget.with_notes(*notes);
    }
    let budget = context.tracker.add_budget(budget)?;
    output::success(format!(
        "Budget {} created: {} {} {}",
        short_id(&budget),
        budget.category,
        budget.period,
        format_money(budget.amount)
    ));
    Ok(())
}

fn cmd_edit_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut budget = resolve_budget(context, require(args, 0, "id|category")?)?;
    budget.amount = parse_amount(require(args, 1, "amount")?)?;
    if let Some(raw) = args.get(2) {
        budget.period = PeriodKind::parse(raw);
    }
    let budget = context.tracker.update_budget(budget)?;
    output::success(format!(
        "Budget {} updated: {} {} {}",
        short_id(&budget),
        budget.category,
        budget.period,
        format_money(budget.amount)
    ));
    Ok(())
}

fn cmd_deactivate_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let budget = resolve_budget(context, require(args, 0, "id|category")?)?;
    let budget = context.tracker.deactivate_budget(budget.id)?;
    output::success(format!(
        "Budget {} ({}) deactivated.",
        short_id(&budget),
        budget.category
    ));
    Ok(())
}

fn cmd_delete_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let budget = resolve_budget(context, require(args, 0, "id|category")?)?;
    context.tracker.delete_budget(budget.id)?;
    output::success(format!(
        "Budget {} ({}) deleted.",
        short_id(&budget),
        budget.category
    ));
    Ok(())
}

fn cmd_budgets(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let budgets = context.tracker.budgets().all()?;
    output::section("Budgets");
    if budgets.is_empty() {
        output::info("No budgets yet. Use `add-budget <category> <amount>`.");
        return Ok(());
    }
    for budget in &budgets {
        output::line(format!(
            "  {}  {:<16} {:<8} {:>12}  {}",
            short_id(budget),
            budget.category,
            budget.period,
            format_money(budget.amount),
            if budget.is_active { "active" } else { "inactive" }
        ));
    }
    Ok(())
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let usages = context.tracker.budget_overview()?;
    output::section("Budget status");
    if usages.is_empty() {
        output::info("No active budgets.");
        return Ok(());
    }
    for usage in &usages {
        output::line(render_usage(usage));
    }
    if let Some(total) = context.tracker.aggregate_usage()? {
        output::info(format!(
            "This month: {} of {} across all budgets ({}%, {})",
            format_money(total.total_spent),
            format_money(total.total_budget),
            total.total_percent,
            total.status
        ));
    }
    Ok(())
}

fn render_usage(usage: &BudgetUsage) -> String {
    const BAR_WIDTH: usize = 20;
    let filled = usize::from(usage.display_percent) * BAR_WIDTH / 100;
    let marker = match usage.status {
        BudgetStatus::WithinLimit => "",
        BudgetStatus::Warning => "  (warning)",
        BudgetStatus::Exceeded => "  (exceeded)",
    };
    format!(
        "  {:<16} {:<8} [{}{}] {:>3}%  {} of {}, {} left{}",
        usage.category,
        usage.period,
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        usage.display_percent,
        format_money(usage.spent),
        format_money(usage.limit),
        format_money(usage.remaining),
        marker
    )
}
