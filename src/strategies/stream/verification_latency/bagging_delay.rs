use crate::budget::BudgetManager;
use crate::classifiers::{FrequencyClassifier, ParzenWindowClassifier, ParzenWindowConfig};
use crate::core::validation::check_equal_missing_label;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::{Error, Result};
use crate::strategies::stream::verification_latency::delay_wrapper::PendingLabelModel;
use crate::strategies::stream::verification_latency::{DelayWrapperBase, SimulatedArrival, pending_set};
use crate::strategies::stream::{StreamQueryResult, StreamQueryStrategy, first_utility, sample_and_commit};
use crate::utils::ProbabilityCorrector;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_k() -> usize {
    2
}
pub(crate) fn default_delay_prior() -> f64 {
    0.001
}
fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BaggingDelayConfig {
    #[serde(default = "default_k")]
    #[schemars(
        title = "Simulations",
        description = "Number of label draws averaged per candidate.",
        default = "default_k"
    )]
    pub k: usize,

    #[serde(default = "default_delay_prior")]
    #[schemars(
        title = "Delay prior",
        description = "Added to the class frequencies of pending instances.",
        default = "default_delay_prior"
    )]
    pub delay_prior: f64,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    #[schemars(title = "Simulated arrival")]
    pub arrival: SimulatedArrival,
}

impl Default for BaggingDelayConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            delay_prior: default_delay_prior(),
            seed: default_seed(),
            arrival: SimulatedArrival::default(),
        }
    }
}

/// Averages the wrapped strategy's utility over `k` draws of the labels that
/// are still pending when a candidate is judged.
pub struct BaggingDelaySimulator {
    base: DelayWrapperBase,
    clf: Box<dyn FrequencyClassifier>,
    corrector: ProbabilityCorrector,
    k: usize,
    arrival: SimulatedArrival,
    rng: StdRng,
}

impl BaggingDelaySimulator {
    /// `clf` estimates the labels of pending instances; a Parzen window
    /// classifier is used when it is `None`.
    pub fn new(
        config: BaggingDelayConfig,
        base_strategy: Option<Box<dyn StreamQueryStrategy>>,
        clf: Option<Box<dyn FrequencyClassifier>>,
    ) -> Result<Self> {
        if config.k == 0 {
            return Err(Error::InvalidParameter("K must be an integer >= 1".into()));
        }
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
            k: config.k,
            arrival: config.arrival,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl StreamQueryStrategy for BaggingDelaySimulator {
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
            let probas = if pending.is_empty() {
                Vec::new()
            } else {
                label_model.probabilities(data, &pending)?
            };
            // no pending labels, or no class known yet to draw them from
            if probas.first().is_none_or(|p| p.is_empty()) {
                debug!(candidate = i, pending = pending.len(), "querying on observed data");
                let r = self.base.base_mut().query(&one, data, true)?;
                utilities.push(first_utility(&r)?);
                continue;
            }

            let samplers = probas
                .iter()
                .map(|p| WeightedIndex::new(p).map_err(|e| Error::InvalidDistribution(e.to_string())))
                .collect::<Result<Vec<_>>>()?;
            let mut hypothetical = data.clone();
            let arrivals = self.arrival.arrival_times(data, &pending, candidates.tx[i]);
            for (&j, t) in pending.iter().zip(arrivals) {
                hypothetical.ty[j] = t;
            }

            let mut total = 0.0;
            for _ in 0..self.k {
                for (&j, sampler) in pending.iter().zip(&samplers) {
                    hypothetical.y[j] = sampler.sample(&mut self.rng) as f64;
                }
                let r = self.base.base_mut().query(&one, &hypothetical, true)?;
                total += first_utility(&r)?;
            }
            debug!(candidate = i, pending = pending.len(), k = self.k, "simulated pending labels");
            utilities.push(total / self.k as f64);
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
