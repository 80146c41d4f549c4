mod budget_manager;
mod fixed_budget;

pub use budget_manager::{BudgetManager, BudgetState};
pub use fixed_budget::{FixedBudget, FixedBudgetConfig};
