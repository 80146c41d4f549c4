use crate::error::Result;

/// Counters persisted by a budget manager between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetState {
    pub observed: u64,
    pub sampled: u64,
}

/// Decides, from a stream of utilities, which instances the labeling budget
/// allows to be acquired.
pub trait BudgetManager {
    /// Fraction of observed instances that may be labeled.
    fn budget(&self) -> f64;

    /// Indices of `utilities` to acquire, in order. With `simulate` set the
    /// persisted [`BudgetState`] is left untouched.
    fn sample(&mut self, utilities: &[f64], simulate: bool) -> Vec<usize>;

    /// Commits a final decision over `n_candidates` instances.
    fn update(&mut self, n_candidates: usize, sampled: &[usize]) -> Result<()>;

    fn state(&self) -> BudgetState;

    fn boxed_clone(&self) -> Box<dyn BudgetManager>;
}
