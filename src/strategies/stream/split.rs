use crate::budget::{BudgetManager, FixedBudget, FixedBudgetConfig};
use crate::classifiers::{Classifier, ParzenWindowClassifier, ParzenWindowConfig};
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::{Error, Result};
use crate::strategies::stream::fixed_uncertainty::uncertainty_utilities;
use crate::strategies::stream::{
    StreamQueryResult, StreamQueryStrategy, check_sampled, sample_and_commit, validate_stream_query,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_v() -> f64 {
    0.1
}
fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SplitConfig {
    #[serde(default = "default_v")]
    #[schemars(
        title = "Random fraction",
        description = "Probability of scoring a candidate at random instead of by uncertainty.",
        default = "default_v"
    )]
    pub v: f64,

    #[serde(default)]
    #[schemars(title = "Budget")]
    pub budget: FixedBudgetConfig,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            v: default_v(),
            budget: FixedBudgetConfig::default(),
            seed: default_seed(),
        }
    }
}

/// Mixes exploration and exploitation: each candidate is scored by a random
/// utility with probability `v` and by classifier uncertainty otherwise.
pub struct Split {
    v: f64,
    clf: Box<dyn Classifier>,
    budget_manager: Box<dyn BudgetManager>,
    rng: StdRng,
}

impl Split {
    pub fn new(config: SplitConfig, clf: Box<dyn Classifier>) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.v) {
            return Err(Error::InvalidParameter(format!(
                "v must be in [0, 1], got {}",
                config.v
            )));
        }
        Ok(Self {
            v: config.v,
            clf,
            budget_manager: Box::new(FixedBudget::new(config.budget)?),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// `Split` with default settings over a Parzen window classifier that
    /// infers its classes from the data.
    pub fn with_defaults() -> Result<Self> {
        let clf = ParzenWindowClassifier::new(ParzenWindowConfig::default())?;
        Self::new(SplitConfig::default(), Box::new(clf))
    }

    pub fn with_budget_manager(mut self, budget_manager: Box<dyn BudgetManager>) -> Self {
        self.budget_manager = budget_manager;
        self
    }
}

impl StreamQueryStrategy for Split {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        validate_stream_query(candidates, data, self.clf.missing_label())?;
        let uncertainty = uncertainty_utilities(self.clf.as_ref(), candidates, data)?;
        let utilities = uncertainty
            .into_iter()
            .map(|u| {
                if self.rng.random::<f64>() < self.v {
                    self.rng.random::<f64>()
                } else {
                    u
                }
            })
            .collect();
        sample_and_commit(self, candidates, utilities, simulate)
    }

    fn update(
        &mut self,
        candidates: &StreamCandidates,
        sampled: &[usize],
        _utilities: Option<&[f64]>,
    ) -> Result<()> {
        check_sampled(candidates, sampled)?;
        self.budget_manager.update(candidates.len(), sampled)
    }

    fn budget_manager(&self) -> &dyn BudgetManager {
        self.budget_manager.as_ref()
    }

    fn budget_manager_mut(&mut self) -> &mut dyn BudgetManager {
        self.budget_manager.as_mut()
    }

    fn missing_label(&self) -> MissingLabel {
        self.clf.missing_label()
    }
}
