use crate::budget::BudgetManager;
use crate::classifiers::{FrequencyClassifier, ParzenWindowClassifier, ParzenWindowConfig};
use crate::core::validation::check_equal_missing_label;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::Result;
use crate::strategies::stream::verification_latency::bagging_delay::default_delay_prior;
use crate::strategies::stream::verification_latency::delay_wrapper::PendingLabelModel;
use crate::strategies::stream::verification_latency::{DelayWrapperBase, SimulatedArrival, pending_set};
use crate::strategies::stream::{StreamQueryResult, StreamQueryStrategy, first_utility, sample_and_commit};
use crate::utils::ProbabilityCorrector;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FuzzyDelayConfig {
    #[serde(default = "default_delay_prior")]
    #[schemars(
        title = "Delay prior",
        description = "Added to the class frequencies of pending instances.",
        default = "default_delay_prior"
    )]
    pub delay_prior: f64,

    #[serde(default)]
    #[schemars(title = "Simulated arrival")]
    pub arrival: SimulatedArrival,
}

impl Default for FuzzyDelayConfig {
    fn default() -> Self {
        Self {
            delay_prior: default_delay_prior(),
            arrival: SimulatedArrival::default(),
        }
    }
}

/// Replaces sampling by soft labels: every pending instance contributes one
/// pseudo-instance per class, weighted by the probability of that class.
pub struct FuzzyDelaySimulator {
    base: DelayWrapperBase,
    clf: Box<dyn FrequencyClassifier>,
    corrector: ProbabilityCorrector,
    arrival: SimulatedArrival,
}

impl FuzzyDelaySimulator {
    pub fn new(
        config: FuzzyDelayConfig,
        base_strategy: Option<Box<dyn StreamQueryStrategy>>,
        clf: Option<Box<dyn FrequencyClassifier>>,
    ) -> Result<Self> {
        let corrector = ProbabilityCorrector::new(config.delay_prior)?;
        let base = DelayWrapperBase::new(base_strategy)?;
        let clf = match clf {
            Some(clf) => clf,
            None => Box::new(ParzenWindowClassifier::new(ParzenWindowConfig {
                missing_label: base.missing_label(),
                ..ParzenWindowConfig::default()
            })?),
        };
        check_equal_missing_label(clf.missing_label(), base.missing_label())?;
        Ok(Self {
            base,
            clf,
            corrector,
            arrival: config.arrival,
        })
    }

    /// `data` extended by the weighted pseudo-instances of `pending`.
    fn augment(
        &self,
        data: &DelayedTrainingData,
        pending: &[usize],
        probas: &[Vec<f64>],
        tx_cand: f64,
    ) -> DelayedTrainingData {
        let mut augmented = data.clone();
        if augmented.sample_weight.is_none() {
            augmented.sample_weight = Some(vec![1.0; data.len()]);
        }
        let arrivals = self.arrival.arrival_times(data, pending, tx_cand);
        for ((&j, p), ty) in pending.iter().zip(probas).zip(arrivals) {
            for (class, &weight) in p.iter().enumerate() {
                augmented.push(data.x[j].clone(), class as f64, data.tx[j], ty, true, weight);
            }
        }
        augmented
    }
}

impl StreamQueryStrategy for FuzzyDelaySimulator {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        self.base.validate(candidates, data)?;
        let mut label_model = PendingLabelModel::new(self.clf.as_ref(), self.corrector);
        let mut utilities = Vec::with_capacity(candidates.len());

        for i in 0..candidates.len() {
            let one = candidates.single(i);
            let pending = pending_set(data, candidates.tx[i], candidates.ty[i]);
            let r = if pending.is_empty() {
                debug!(candidate = i, pending = 0, "querying on observed data");
                self.base.base_mut().query(&one, data, true)?
            } else {
                let probas = label_model.probabilities(data, &pending)?;
                let augmented = self.augment(data, &pending, &probas, candidates.tx[i]);
                debug!(
                    candidate = i,
                    pending = pending.len(),
                    pseudo = augmented.len() - data.len(),
                    "querying on soft-labeled data"
                );
                self.base.base_mut().query(&one, &augmented, true)?
            };
            utilities.push(first_utility(&r)?);
        }

        sample_and_commit(self, candidates, utilities, simulate)
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
