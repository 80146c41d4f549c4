use crate::budget::BudgetManager;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::{Error, Result};

/// Decisions and utilities for a batch of stream candidates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamQueryResult {
    /// Positions in the candidate batch chosen for labeling.
    pub sampled: Vec<usize>,
    /// One utility per candidate.
    pub utilities: Vec<f64>,
}

/// Stream-based query strategy.
///
/// `query` judges candidates in arrival order. With `simulate` set it must
/// leave every persisted counter as it found it, so the caller can commit a
/// different decision later through `update`. Without it the strategy
/// commits its own decision, with the same effect as a simulated query
/// followed by `update` with the returned decision.
pub trait StreamQueryStrategy {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult>;

    fn update(
        &mut self,
        candidates: &StreamCandidates,
        sampled: &[usize],
        utilities: Option<&[f64]>,
    ) -> Result<()>;

    fn budget_manager(&self) -> &dyn BudgetManager;

    fn budget_manager_mut(&mut self) -> &mut dyn BudgetManager;

    fn missing_label(&self) -> MissingLabel;
}

pub fn validate_stream_query(
    candidates: &StreamCandidates,
    data: &DelayedTrainingData,
    missing_label: MissingLabel,
) -> Result<()> {
    let cand_features = candidates.validate()?;
    let n_features = data.validate(missing_label)?;
    if !candidates.is_empty() && !data.is_empty() && cand_features != n_features {
        return Err(Error::InvalidShape(format!(
            "candidates have {cand_features} features, training data has {n_features}"
        )));
    }
    Ok(())
}

/// Lets the budget manager decide in simulate mode, then commits through
/// `update` unless the whole call is a simulation.
pub(crate) fn sample_and_commit<S: StreamQueryStrategy + ?Sized>(
    strategy: &mut S,
    candidates: &StreamCandidates,
    utilities: Vec<f64>,
    simulate: bool,
) -> Result<StreamQueryResult> {
    let sampled = strategy.budget_manager_mut().sample(&utilities, true);
    if !simulate {
        strategy.update(candidates, &sampled, Some(&utilities))?;
    }
    Ok(StreamQueryResult { sampled, utilities })
}

pub(crate) fn first_utility(result: &StreamQueryResult) -> Result<f64> {
    result
        .utilities
        .first()
        .copied()
        .ok_or(Error::LengthMismatch {
            what: "utilities",
            expected: 1,
            found: 0,
        })
}

pub(crate) fn check_sampled(candidates: &StreamCandidates, sampled: &[usize]) -> Result<()> {
    if let Some(&index) = sampled.iter().find(|&&i| i >= candidates.len()) {
        return Err(Error::IndexOutOfBounds {
            what: "candidates",
            index,
            len: candidates.len(),
        });
    }
    Ok(())
}
