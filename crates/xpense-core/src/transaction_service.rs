use chrono::{Duration, NaiveDateTime};
use tracing::info;
use xpense_domain::Transaction;

use crate::{CoreError, LedgerStore, MonthTotals, SpendingAggregator};

pub struct TransactionService<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> TransactionService<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    /// Records a transaction and returns the id the store assigned.
    pub fn add(&self, transaction: Transaction) -> Result<u64, CoreError> {
        validate(&transaction)?;
        let id = self.store.insert_transaction(transaction)?;
        info!(transaction = id, "transaction recorded");
        Ok(id)
    }

    pub fn update(&self, transaction: Transaction) -> Result<(), CoreError> {
        validate(&transaction)?;
        let id = transaction.id;
        self.store.replace_transaction(transaction)?;
        info!(transaction = id, "transaction updated");
        Ok(())
    }

    pub fn delete(&self, id: u64) -> Result<(), CoreError> {
        self.store.remove_transaction(id)?;
        info!(transaction = id, "transaction deleted");
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<Transaction, CoreError> {
        self.store
            .all_transactions()?
            .into_iter()
            .find(|txn| txn.id == id)
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// All transactions, newest first.
    pub fn list(&self) -> Result<Vec<Transaction>, CoreError> {
        let mut transactions = self.store.all_transactions()?;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    /// Transactions stamped within the last `days` days up to `now`, newest first.
    pub fn recent(&self, now: NaiveDateTime, days: i64) -> Result<Vec<Transaction>, CoreError> {
        let since = Duration::try_days(days)
            .filter(|span| *span >= Duration::zero())
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| CoreError::Validation(format!("Day count {days} is out of range")))?;
        Ok(self
            .list()?
            .into_iter()
            .filter(|txn| txn.timestamp >= since && txn.timestamp <= now)
            .collect())
    }

    pub fn month_totals(
        &self,
        aggregator: &SpendingAggregator,
        now: NaiveDateTime,
    ) -> Result<MonthTotals, CoreError> {
        Ok(aggregator.month_totals(now, &self.store.all_transactions()?))
    }
}

fn validate(transaction: &Transaction) -> Result<(), CoreError> {
    if transaction.title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".into()));
    }
    if transaction.category.trim().is_empty() {
        return Err(CoreError::Validation("Category is required".into()));
    }
    if !transaction.amount.is_finite() || transaction.amount <= 0.0 {
        return Err(CoreError::Validation("Amount must be greater than 0".into()));
    }
    Ok(())
}
