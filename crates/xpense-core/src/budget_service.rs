use tracing::{debug, info};
use uuid::Uuid;
use xpense_domain::{same_category, Budget};

use crate::{CoreError, LedgerStore};

/// Budget lifecycle over a [`LedgerStore`]: creation with the one-active-per-slot
/// rule, full replacement, deactivation and deletion.
pub struct BudgetService<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> BudgetService<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<Vec<Budget>, CoreError> {
        self.store.all_budgets()
    }

    pub fn active(&self) -> Result<Vec<Budget>, CoreError> {
        Ok(self
            .store
            .all_budgets()?
            .into_iter()
            .filter(|budget| budget.is_active)
            .collect())
    }

    pub fn get(&self, id: Uuid) -> Result<Budget, CoreError> {
        self.store
            .all_budgets()?
            .into_iter()
            .find(|budget| budget.id == id)
            .ok_or(CoreError::BudgetNotFound(id))
    }

    /// First active budget whose category matches, ignoring case.
    pub fn budget_for_category(&self, category: &str) -> Result<Option<Budget>, CoreError> {
        Ok(self
            .active()?
            .into_iter()
            .find(|budget| same_category(&budget.category, category)))
    }

    /// Stores a new budget. Fails with [`CoreError::DuplicateBudget`] when an
    /// active budget already covers the same category and period.
    pub fn add(&self, budget: Budget) -> Result<Budget, CoreError> {
        validate(&budget)?;
        if budget.is_active {
            let existing = self.store.all_budgets()?;
            if existing.iter().any(|other| other.conflicts_with(&budget)) {
                debug!(category = %budget.category, period = %budget.period, "duplicate budget rejected");
                return Err(CoreError::DuplicateBudget {
                    category: budget.category,
                    period: budget.period,
                });
            }
        }
        self.store.insert_budget(budget.clone())?;
        info!(budget = %budget.id, category = %budget.category, "budget created");
        Ok(budget)
    }

    /// Replaces the stored budget with the same id. Uniqueness is not re-checked.
    pub fn update(&self, budget: Budget) -> Result<Budget, CoreError> {
        validate(&budget)?;
        self.store.replace_budget(budget.clone())?;
        info!(budget = %budget.id, category = %budget.category, "budget updated");
        Ok(budget)
    }

    /// Marks a budget inactive. There is no way back; create a new budget instead.
    pub fn deactivate(&self, id: Uuid) -> Result<Budget, CoreError> {
        let mut budget = self.get(id)?;
        budget.is_active = false;
        self.store.replace_budget(budget.clone())?;
        info!(budget = %id, "budget deactivated");
        Ok(budget)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        self.store.remove_budget(id)?;
        info!(budget = %id, "budget deleted");
        Ok(())
    }

    pub fn clear_all(&self) -> Result<(), CoreError> {
        self.store.clear_budgets()
    }
}

fn validate(budget: &Budget) -> Result<(), CoreError> {
    if budget.category.trim().is_empty() {
        return Err(CoreError::Validation("Please select a category".into()));
    }
    if !budget.amount.is_finite() || budget.amount <= 0.0 {
        return Err(CoreError::Validation(
            "Amount must be greater than zero".into(),
        ));
    }
    Ok(())
}
