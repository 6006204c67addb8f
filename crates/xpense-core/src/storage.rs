use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;
use xpense_domain::{Budget, Transaction};

use crate::CoreError;

/// Abstraction over the persistence collaborator that owns transactions and budgets.
///
/// Each call is atomic for the single record it touches. Readers receive
/// snapshots; nothing returned here is shared with the store afterwards.
pub trait LedgerStore: Send + Sync {
    fn all_transactions(&self) -> Result<Vec<Transaction>, CoreError>;
    fn all_budgets(&self) -> Result<Vec<Budget>, CoreError>;
    /// Stores a new transaction and returns the identifier assigned to it.
    fn insert_transaction(&self, transaction: Transaction) -> Result<u64, CoreError>;
    fn replace_transaction(&self, transaction: Transaction) -> Result<(), CoreError>;
    fn remove_transaction(&self, id: u64) -> Result<(), CoreError>;
    fn insert_budget(&self, budget: Budget) -> Result<(), CoreError>;
    fn replace_budget(&self, budget: Budget) -> Result<(), CoreError>;
    fn remove_budget(&self, id: Uuid) -> Result<(), CoreError>;
    fn clear_budgets(&self) -> Result<(), CoreError>;
}

/// Next monotonically assigned transaction id: one past the largest in use.
pub fn next_transaction_id(existing: &[Transaction]) -> u64 {
    existing.iter().map(|txn| txn.id).max().unwrap_or(0) + 1
}

/// Replaces the transaction with the same id, failing when none matches.
pub fn replace_transaction_in(
    transactions: &mut [Transaction],
    transaction: Transaction,
) -> Result<(), CoreError> {
    let slot = transactions
        .iter_mut()
        .find(|existing| existing.id == transaction.id)
        .ok_or(CoreError::TransactionNotFound(transaction.id))?;
    *slot = transaction;
    Ok(())
}

pub fn remove_transaction_from(
    transactions: &mut Vec<Transaction>,
    id: u64,
) -> Result<(), CoreError> {
    let before = transactions.len();
    transactions.retain(|txn| txn.id != id);
    if transactions.len() == before {
        return Err(CoreError::TransactionNotFound(id));
    }
    Ok(())
}

/// Fails when a budget with the same id is already stored.
pub fn ensure_new_budget(budgets: &[Budget], budget: &Budget) -> Result<(), CoreError> {
    if budgets.iter().any(|existing| existing.id == budget.id) {
        return Err(CoreError::Storage(format!(
            "budget {} already stored",
            budget.id
        )));
    }
    Ok(())
}

pub fn replace_budget_in(budgets: &mut [Budget], budget: Budget) -> Result<(), CoreError> {
    let slot = budgets
        .iter_mut()
        .find(|existing| existing.id == budget.id)
        .ok_or(CoreError::BudgetNotFound(budget.id))?;
    *slot = budget;
    Ok(())
}

pub fn remove_budget_from(budgets: &mut Vec<Budget>, id: Uuid) -> Result<(), CoreError> {
    let before = budgets.len();
    budgets.retain(|budget| budget.id != id);
    if budgets.len() == before {
        return Err(CoreError::BudgetNotFound(id));
    }
    Ok(())
}

/// Volatile store used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    transactions: Mutex<Vec<Transaction>>,
    budgets: Mutex<Vec<Budget>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(transactions: Vec<Transaction>, budgets: Vec<Budget>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            budgets: Mutex::new(budgets),
        }
    }

    fn transactions(&self) -> Result<MutexGuard<'_, Vec<Transaction>>, CoreError> {
        self.transactions
            .lock()
            .map_err(|_| CoreError::Storage("transaction lock poisoned".into()))
    }

    fn budgets(&self) -> Result<MutexGuard<'_, Vec<Budget>>, CoreError> {
        self.budgets
            .lock()
            .map_err(|_| CoreError::Storage("budget lock poisoned".into()))
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn all_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.transactions()?.clone())
    }

    fn all_budgets(&self) -> Result<Vec<Budget>, CoreError> {
        Ok(self.budgets()?.clone())
    }

    fn insert_transaction(&self, mut transaction: Transaction) -> Result<u64, CoreError> {
        let mut transactions = self.transactions()?;
        transaction.id = next_transaction_id(&transactions);
        let id = transaction.id;
        transactions.push(transaction);
        Ok(id)
    }

    fn replace_transaction(&self, transaction: Transaction) -> Result<(), CoreError> {
        let mut transactions = self.transactions()?;
        replace_transaction_in(&mut transactions, transaction)
    }

    fn remove_transaction(&self, id: u64) -> Result<(), CoreError> {
        let mut transactions = self.transactions()?;
        remove_transaction_from(&mut transactions, id)
    }

    fn insert_budget(&self, budget: Budget) -> Result<(), CoreError> {
        let mut budgets = self.budgets()?;
        ensure_new_budget(&budgets, &budget)?;
        budgets.push(budget);
        Ok(())
    }

    fn replace_budget(&self, budget: Budget) -> Result<(), CoreError> {
        let mut budgets = self.budgets()?;
        replace_budget_in(&mut budgets, budget)
    }

    fn remove_budget(&self, id: Uuid) -> Result<(), CoreError> {
        let mut budgets = self.budgets()?;
        remove_budget_from(&mut budgets, id)
    }

    fn clear_budgets(&self) -> Result<(), CoreError> {
        self.budgets()?.clear();
        Ok(())
    }
}
