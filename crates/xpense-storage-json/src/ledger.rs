use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use xpense_core::{
    ensure_new_budget, next_transaction_id, remove_budget_from, remove_transaction_from,
    replace_budget_in, replace_transaction_in, CoreError, LedgerStore,
};
use xpense_domain::{Budget, Transaction};

use crate::{
    files::{read_json, write_json},
    StoragePaths,
};

/// On-disk shape of `transactions.json`. `next_id` keeps ids from being reused
/// after the newest transaction is deleted.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TransactionFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl TransactionFile {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(next_transaction_id(&self.transactions));
        self.next_id = id + 1;
        id
    }
}

/// Ledger persisted as two JSON documents. Every mutation rewrites the
/// affected file atomically while holding the store lock.
pub struct JsonLedgerStore {
    paths: StoragePaths,
    lock: Mutex<()>,
}

impl JsonLedgerStore {
    pub fn open(paths: StoragePaths) -> Result<Self, CoreError> {
        paths.ensure()?;
        Ok(Self {
            paths,
            lock: Mutex::new(()),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_transactions(&self) -> Result<TransactionFile, CoreError> {
        read_json(&self.paths.transactions())
    }

    fn save_transactions(&self, file: &TransactionFile) -> Result<(), CoreError> {
        write_json(&self.paths.transactions(), file)
    }

    fn load_budgets(&self) -> Result<Vec<Budget>, CoreError> {
        read_json(&self.paths.budgets())
    }

    fn save_budgets(&self, budgets: &[Budget]) -> Result<(), CoreError> {
        write_json(&self.paths.budgets(), budgets)
    }
}

impl LedgerStore for JsonLedgerStore {
    fn all_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        let _guard = self.guard();
        Ok(self.load_transactions()?.transactions)
    }

    fn all_budgets(&self) -> Result<Vec<Budget>, CoreError> {
        let _guard = self.guard();
        self.load_budgets()
    }

    fn insert_transaction(&self, mut transaction: Transaction) -> Result<u64, CoreError> {
        let _guard = self.guard();
        let mut file = self.load_transactions()?;
        let id = file.allocate_id();
        transaction.id = id;
        file.transactions.push(transaction);
        self.save_transactions(&file)?;
        debug!(transaction = id, "transaction written");
        Ok(id)
    }

    fn replace_transaction(&self, transaction: Transaction) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut file = self.load_transactions()?;
        replace_transaction_in(&mut file.transactions, transaction)?;
        self.save_transactions(&file)
    }

    fn remove_transaction(&self, id: u64) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut file = self.load_transactions()?;
        file.next_id = file.next_id.max(next_transaction_id(&file.transactions));
        remove_transaction_from(&mut file.transactions, id)?;
        self.save_transactions(&file)
    }

    fn insert_budget(&self, budget: Budget) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut budgets = self.load_budgets()?;
        ensure_new_budget(&budgets, &budget)?;
        budgets.push(budget);
        self.save_budgets(&budgets)
    }

    fn replace_budget(&self, budget: Budget) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut budgets = self.load_budgets()?;
        replace_budget_in(&mut budgets, budget)?;
        self.save_budgets(&budgets)
    }

    fn remove_budget(&self, id: Uuid) -> Result<(), CoreError> {
        let _guard = self.guard();
        let mut budgets = self.load_budgets()?;
        remove_budget_from(&mut budgets, id)?;
        self.save_budgets(&budgets)
    }

    fn clear_budgets(&self) -> Result<(), CoreError> {
        let _guard = self.guard();
        self.save_budgets(&[])
    }
}
