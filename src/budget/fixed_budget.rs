use crate::budget::{BudgetManager, BudgetState};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_budget() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FixedBudgetConfig {
    #[serde(default = "default_budget")]
    #[schemars(
        title = "Budget",
        description = "Fraction of the stream that may be labeled, in (0, 1].",
        default = "default_budget"
    )]
    pub budget: f64,
}

impl Default for FixedBudgetConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

/// Budget manager that labels an instance when budget is left and its
/// utility is at least `1 - budget`.
#[derive(Debug, Clone)]
pub struct FixedBudget {
    budget: f64,
    state: BudgetState,
}

impl FixedBudget {
    pub fn new(config: FixedBudgetConfig) -> Result<Self> {
        if !(config.budget > 0.0 && config.budget <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "budget must be in (0, 1], got {}",
                config.budget
            )));
        }
        Ok(Self {
            budget: config.budget,
            state: BudgetState::default(),
        })
    }

    #[inline]
    fn is_budget_left(&self) -> bool {
        self.state.observed as f64 * self.budget - self.state.sampled as f64 >= 1.0
    }
}

impl Default for FixedBudget {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            state: BudgetState::default(),
        }
    }
}

impl BudgetManager for FixedBudget {
    fn budget(&self) -> f64 {
        self.budget
    }

    fn sample(&mut self, utilities: &[f64], simulate: bool) -> Vec<usize> {
        let snapshot = self.state;
        let mut sampled = Vec::new();
        for (i, &utility) in utilities.iter().enumerate() {
            self.state.observed += 1;
            if self.is_budget_left() && utility >= 1.0 - self.budget {
                self.state.sampled += 1;
                sampled.push(i);
            }
        }
        if simulate {
            self.state = snapshot;
        }
        sampled
    }

    fn update(&mut self, n_candidates: usize, sampled: &[usize]) -> Result<()> {
        if let Some(&index) = sampled.iter().find(|&&i| i >= n_candidates) {
            return Err(Error::IndexOutOfBounds {
                what: "candidates",
                index,
                len: n_candidates,
            });
        }
        self.state.observed += n_candidates as u64;
        self.state.sampled += sampled.len() as u64;
        Ok(())
    }

    fn state(&self) -> BudgetState {
        self.state
    }

    fn boxed_clone(&self) -> Box<dyn BudgetManager> {
        Box::new(self.clone())
    }
}
