use thiserror::Error;
use uuid::Uuid;
use xpense_domain::PeriodKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("An active {period} budget for `{category}` already exists")]
    DuplicateBudget { category: String, period: PeriodKind },
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(u64),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for failures the caller reports as a plain "not saved" outcome.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateBudget { .. }
                | CoreError::BudgetNotFound(_)
                | CoreError::TransactionNotFound(_)
                | CoreError::Validation(_)
        )
    }
}
