use xpense_domain::{canonical_category, format_money, Transaction};

use crate::cli::commands::{parse_amount, parse_timestamp, require};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const DEFAULT_LISTING_DAYS: i64 = 30;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add-expense",
            "Record an expense",
            "add-expense <title> <amount> <category> [YYYY-MM-DD] [payment method]",
            cmd_add_expense,
        ),
        CommandEntry::new(
            "add-income",
            "Record income",
            "add-income <title> <amount> <category> [YYYY-MM-DD]",
            cmd_add_income,
        ),
        CommandEntry::new(
            "transactions",
            "List recent transactions",
            "transactions [days]",
            cmd_transactions,
        ),
        CommandEntry::new(
            "delete-transaction",
            "Delete a transaction by id",
            "delete-transaction <id>",
            cmd_delete_transaction,
        ),
    ]
}

fn build(context: &ShellContext, args: &[&str], income: bool) -> Result<Transaction, CommandError> {
    let title = require(args, 0, "title")?;
    let amount = parse_amount(require(args, 1, "amount")?)?;
    let category = require(args, 2, "category")?;
    // known categories are stored with their canonical spelling
    let category = canonical_category(category, income).unwrap_or(category);
    let timestamp = match args.get(3) {
        Some(raw) => parse_timestamp(raw)?,
        None => context.tracker.now(),
    };
    let transaction = if income {
        Transaction::income(title, amount, category, timestamp)
    } else {
        Transaction::expense(title, amount, category, timestamp)
    };
    Ok(match args.get(4) {
        Some(method) => transaction.with_payment_method(*method),
        None => transaction,
    })
}

fn cmd_add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let transaction = build(context, args, false)?;
    let summary = format!(
        "{} {} in {}",
        transaction.title,
        format_money(transaction.amount),
        transaction.category
    );
    let id = context.tracker.add_transaction(transaction)?;
    output::success(format!("Expense #{id} recorded: {summary}"));
    Ok(())
}

fn cmd_add_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let transaction = build(context, args, true)?;
    let amount = format_money(transaction.amount);
    let id = context.tracker.add_transaction(transaction)?;
    output::success(format!("Income #{id} recorded: {amount}"));
    Ok(())
}

fn cmd_transactions(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let days = match args.first() {
        Some(raw) => raw.parse::<i64>().ok().filter(|days| *days > 0).ok_or_else(|| {
            CommandError::InvalidArguments(format!("invalid day count `{raw}`"))
        })?,
        None => DEFAULT_LISTING_DAYS,
    };
    let recent = context
        .tracker
        .transactions()
        .recent(context.tracker.now(), days)?;
    output::section(format!("Transactions (last {days} days)"));
    if recent.is_empty() {
        output::info("No transactions recorded.");
    }
    for txn in &recent {
        output::line(format!(
            "  #{:<4} {}  {:<20} {:<14} {:>12}",
            txn.id,
            txn.timestamp.format("%Y-%m-%d %H:%M"),
            txn.title,
            txn.category,
            txn.formatted_amount()
        ));
    }
    let totals = context.tracker.month_totals()?;
    output::info(format!(
        "This month: income {}, expenses {}, balance {}",
        format_money(totals.income),
        format_money(totals.expense),
        format_money(totals.balance)
    ));
    Ok(())
}

fn cmd_delete_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = require(args, 0, "id")?;
    let id = raw
        .trim_start_matches('#')
        .parse::<u64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid transaction id `{raw}`")))?;
    context.tracker.delete_transaction(id)?;
    output::success(format!("Transaction #{id} deleted."));
    Ok(())
}
