use crate::budget::BudgetManager;
use crate::classifiers::FrequencyClassifier;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::Result;
use crate::strategies::stream::{Split, StreamQueryStrategy, validate_stream_query};
use crate::utils::ProbabilityCorrector;

/// State and checks shared by every wrapper that sits between a stream
/// strategy and a stream whose labels arrive late.
///
/// The wrapped strategy is the one whose budget manager and counters are
/// updated; wrappers only reshape what it sees.
pub struct DelayWrapperBase {
    base_strategy: Box<dyn StreamQueryStrategy>,
}

impl DelayWrapperBase {
    /// Wraps `base_strategy`, or a default [`Split`] when none is given.
    pub fn new(base_strategy: Option<Box<dyn StreamQueryStrategy>>) -> Result<Self> {
        let base_strategy = match base_strategy {
            Some(base) => base,
            None => Box::new(Split::with_defaults()?),
        };
        Ok(Self { base_strategy })
    }

    pub fn validate(&self, candidates: &StreamCandidates, data: &DelayedTrainingData) -> Result<()> {
        validate_stream_query(candidates, data, self.base_strategy.missing_label())
    }

    pub fn base(&self) -> &dyn StreamQueryStrategy {
        self.base_strategy.as_ref()
    }

    pub fn base_mut(&mut self) -> &mut dyn StreamQueryStrategy {
        self.base_strategy.as_mut()
    }

    pub fn update(
        &mut self,
        candidates: &StreamCandidates,
        sampled: &[usize],
        utilities: Option<&[f64]>,
    ) -> Result<()> {
        self.base_strategy.update(candidates, sampled, utilities)
    }

    pub fn budget_manager(&self) -> &dyn BudgetManager {
        self.base_strategy.budget_manager()
    }

    pub fn budget_manager_mut(&mut self) -> &mut dyn BudgetManager {
        self.base_strategy.budget_manager_mut()
    }

    pub fn missing_label(&self) -> MissingLabel {
        self.base_strategy.missing_label()
    }
}

/// Acquired instances whose label is still on its way when a candidate
/// arriving at `tx_cand` is judged, and that would have arrived before the
/// candidate's own label at `ty_cand`.
pub fn pending_set(data: &DelayedTrainingData, tx_cand: f64, ty_cand: f64) -> Vec<usize> {
    (0..data.len())
        .filter(|&j| data.acquisitions[j] && data.ty[j] >= tx_cand && data.ty[j] < ty_cand)
        .collect()
}

/// Class probabilities of pending instances, from a frequency classifier that
/// is fitted at most once per query and only if some candidate needs it.
pub(crate) struct PendingLabelModel<'a> {
    template: &'a dyn FrequencyClassifier,
    corrector: ProbabilityCorrector,
    fitted: Option<Box<dyn FrequencyClassifier>>,
}

impl<'a> PendingLabelModel<'a> {
    pub(crate) fn new(template: &'a dyn FrequencyClassifier, corrector: ProbabilityCorrector) -> Self {
        Self {
            template,
            corrector,
            fitted: None,
        }
    }

    pub(crate) fn probabilities(
        &mut self,
        data: &DelayedTrainingData,
        pending: &[usize],
    ) -> Result<Vec<Vec<f64>>> {
        let model = match self.fitted.take() {
            Some(model) => model,
            None => {
                let mut model = self.template.boxed_clone_freq();
                model.fit(&data.x, &data.y, data.sample_weight.as_deref())?;
                model
            }
        };
        let x: Vec<Vec<f64>> = pending.iter().map(|&j| data.x[j].clone()).collect();
        let frequencies = model.predict_freq(&x);
        self.fitted = Some(model);
        Ok(self.corrector.correct(&frequencies?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ParzenWindowClassifier;
    use crate::testing::FixedProbaClassifier;

    fn data() -> DelayedTrainingData {
        DelayedTrainingData::new(
            vec![vec![0.0]; 5],
            vec![0.0, f64::NAN, f64::NAN, f64::NAN, 1.0],
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![1.0, 5.0, 7.0, 9.0, 5.0],
            vec![true, true, false, true, true],
        )
    }

    #[test]
    fn pending_set_requires_acquisition_and_window() {
        // candidate features at 5, label at 9
        assert_eq!(pending_set(&data(), 5.0, 9.0), vec![1, 4]);
        assert!(pending_set(&data(), 10.0, 12.0).is_empty());
        assert_eq!(pending_set(&data(), 0.0, 100.0), vec![0, 1, 3, 4]);
    }

    #[test]
    fn default_base_strategy_is_split() {
        let base = DelayWrapperBase::new(None).unwrap();
        assert_eq!(base.missing_label(), MissingLabel::Nan);
        assert_eq!(base.budget_manager().budget(), 0.1);
    }

    #[test]
    fn validation_rejects_inconsistent_times() {
        let base = DelayWrapperBase::new(None).unwrap();
        let cands = StreamCandidates::new(vec![vec![0.0]], vec![5.0], vec![]);
        assert!(base.validate(&cands, &data()).is_err());

        let mut d = data();
        d.tx.pop();
        let cands = StreamCandidates::new(vec![vec![0.0]], vec![5.0], vec![6.0]);
        assert!(base.validate(&cands, &d).is_err());
        assert!(base.validate(&cands, &data()).is_ok());
    }

    #[test]
    fn label_model_fits_lazily_once() {
        let clf = FixedProbaClassifier::new(vec![3.0, 1.0]);
        let corrector = ProbabilityCorrector::new(0.0).unwrap();
        let mut model = PendingLabelModel::new(&clf, corrector);
        assert_eq!(clf.fit_count(), 0);

        let p = model.probabilities(&data(), &[1, 3]).unwrap();
        assert_eq!(p, vec![vec![0.75, 0.25]; 2]);
        model.probabilities(&data(), &[1]).unwrap();
        assert_eq!(clf.fit_count(), 1);
    }

    #[test]
    fn label_model_applies_prior() {
        let clf = ParzenWindowClassifier::with_classes(3).unwrap();
        let corrector = ProbabilityCorrector::new(0.5).unwrap();
        let mut model = PendingLabelModel::new(&clf, corrector);
        let p = model.probabilities(&data(), &[1]).unwrap();
        // one labeled row each for classes 0 and 1, class 2 never seen
        assert!((p[0][0] - 1.5 / 3.5).abs() < 1e-12);
        assert!((p[0][2] - 0.5 / 3.5).abs() < 1e-12);
    }
}
