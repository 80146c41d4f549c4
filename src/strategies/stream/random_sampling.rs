use crate::budget::{BudgetManager, FixedBudget, FixedBudgetConfig};
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::Result;
use crate::strategies::stream::{
    StreamQueryResult, StreamQueryStrategy, check_sampled, sample_and_commit, validate_stream_query,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RandomSamplingConfig {
    #[serde(default)]
    #[schemars(title = "Budget")]
    pub budget: FixedBudgetConfig,

    #[serde(default)]
    #[schemars(title = "Missing label")]
    pub missing_label: MissingLabel,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for RandomSamplingConfig {
    fn default() -> Self {
        Self {
            budget: FixedBudgetConfig::default(),
            missing_label: MissingLabel::default(),
            seed: default_seed(),
        }
    }
}

/// Assigns every candidate a utility drawn uniformly from `[0, 1)`.
pub struct StreamRandomSampling {
    budget_manager: Box<dyn BudgetManager>,
    missing_label: MissingLabel,
    rng: StdRng,
}

impl StreamRandomSampling {
    pub fn new(config: RandomSamplingConfig) -> Result<Self> {
        Ok(Self {
            budget_manager: Box::new(FixedBudget::new(config.budget)?),
            missing_label: config.missing_label,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    pub fn with_budget_manager(mut self, budget_manager: Box<dyn BudgetManager>) -> Self {
        self.budget_manager = budget_manager;
        self
    }
}

impl StreamQueryStrategy for StreamRandomSampling {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        validate_stream_query(candidates, data, self.missing_label)?;
        let utilities = (0..candidates.len())
            .map(|_| self.rng.random::<f64>())
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
        self.missing_label
    }
}
