use crate::budget::BudgetManager;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::{Error, Result};
use crate::strategies::stream::verification_latency::DelayWrapperBase;
use crate::strategies::stream::{StreamQueryResult, StreamQueryStrategy, first_utility};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_w_train() -> f64 {
    500.0
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ForgettingWindowConfig {
    #[serde(default = "default_w_train")]
    #[schemars(
        title = "Training window",
        description = "Only rows whose features arrived within this span before the candidate's label are used.",
        default = "default_w_train"
    )]
    pub w_train: f64,
}

impl Default for ForgettingWindowConfig {
    fn default() -> Self {
        Self {
            w_train: default_w_train(),
        }
    }
}

/// Hides training rows older than `w_train` from the wrapped strategy.
///
/// A candidate whose label arrives at `ty_cand` is judged as if only rows with
/// `tX >= ty_cand - w_train` had ever been seen.
pub struct ForgettingWindowWrapper {
    base: DelayWrapperBase,
    w_train: f64,
}

impl ForgettingWindowWrapper {
    pub fn new(
        config: ForgettingWindowConfig,
        base_strategy: Option<Box<dyn StreamQueryStrategy>>,
    ) -> Result<Self> {
        if !config.w_train.is_finite() || config.w_train < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "w_train must be a finite number >= 0, got {}",
                config.w_train
            )));
        }
        Ok(Self {
            base: DelayWrapperBase::new(base_strategy)?,
            w_train: config.w_train,
        })
    }

    pub fn w_train(&self) -> f64 {
        self.w_train
    }

    pub fn training_window(&self, data: &DelayedTrainingData, ty_cand: f64) -> DelayedTrainingData {
        let start = ty_cand - self.w_train;
        let mask: Vec<bool> = data.tx.iter().map(|&t| t >= start).collect();
        data.select(&mask)
    }
}

impl StreamQueryStrategy for ForgettingWindowWrapper {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        self.base.validate(candidates, data)?;
        let mut result = StreamQueryResult::default();
        for i in 0..candidates.len() {
            let window = self.training_window(data, candidates.ty[i]);
            debug!(candidate = i, window = window.len(), "forgetting window");
            let r = self
                .base
                .base_mut()
                .query(&candidates.single(i), &window, simulate)?;
            if !r.sampled.is_empty() {
                result.sampled.push(i);
            }
            result.utilities.push(first_utility(&r)?);
        }
        Ok(result)
    }

    fn update(
        &mut self,
        candidates: &StreamCandidates,
        sampled: &[usize],
        utilities: Option<&[f64]>,
    ) -> Result<()> {
        self.base.update(candidates, sampled, utilities)
    }

    fn budget_manager(&self) -> &dyn BudgetManager {
        self.base.budget_manager()
    }

    fn budget_manager_mut(&mut self) -> &mut dyn BudgetManager {
        self.base.budget_manager_mut()
    }

    fn missing_label(&self) -> MissingLabel {
        self.base.missing_label()
    }
}
