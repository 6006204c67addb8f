//! Default category labels offered when a ledger has none of its own.

pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Housing",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Utilities",
    "Health",
    "Education",
    "Personal Care",
    "Travel",
    "Bills",
    "Other",
];

pub const DEFAULT_INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Investments",
    "Gifts",
    "Refunds",
    "Rental Income",
    "Bonus",
    "Other",
];

/// Returns the canonical spelling of a default category, if `name` matches one.
pub fn canonical_category(name: &str, income: bool) -> Option<&'static str> {
    let pool = if income {
        DEFAULT_INCOME_CATEGORIES
    } else {
        DEFAULT_EXPENSE_CATEGORIES
    };
    pool.iter()
        .copied()
        .find(|candidate| crate::common::same_category(candidate, name))
}
