use crate::budget::{BudgetManager, FixedBudget, FixedBudgetConfig};
use crate::classifiers::Classifier;
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::Result;
use crate::strategies::stream::{
    StreamQueryResult, StreamQueryStrategy, check_sampled, sample_and_commit, validate_stream_query,
};
use crate::utils::math::max_value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct FixedUncertaintyConfig {
    #[serde(default)]
    #[schemars(title = "Budget")]
    pub budget: FixedBudgetConfig,
}

/// Uncertainty of each candidate under a classifier fitted on `data`,
/// scaled so that a uniform prediction scores 1 and a certain one scores 0.
pub(crate) fn uncertainty_utilities(
    clf: &dyn Classifier,
    candidates: &StreamCandidates,
    data: &DelayedTrainingData,
) -> Result<Vec<f64>> {
    let mut model = clf.boxed_clone();
    model.fit(&data.x, &data.y, data.sample_weight.as_deref())?;
    let probas = model.predict_proba(&candidates.x)?;
    Ok(probas
        .iter()
        .map(|p| {
            let n_classes = p.len() as f64;
            if p.len() < 2 {
                return 1.0;
            }
            let u = (1.0 - max_value(p)) / (1.0 - 1.0 / n_classes);
            u.clamp(0.0, 1.0)
        })
        .collect())
}

/// Queries candidates whose highest class probability falls below a
/// threshold fixed by the budget: with a [`FixedBudget`] of `b` over `c`
/// classes, a candidate qualifies when `p_max <= 1/c + b (1 - 1/c)`.
pub struct FixedUncertainty {
    clf: Box<dyn Classifier>,
    budget_manager: Box<dyn BudgetManager>,
}

impl FixedUncertainty {
    pub fn new(config: FixedUncertaintyConfig, clf: Box<dyn Classifier>) -> Result<Self> {
        Ok(Self {
            clf,
            budget_manager: Box::new(FixedBudget::new(config.budget)?),
        })
    }

    pub fn with_budget_manager(mut self, budget_manager: Box<dyn BudgetManager>) -> Self {
        self.budget_manager = budget_manager;
        self
    }
}

impl StreamQueryStrategy for FixedUncertainty {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        validate_stream_query(candidates, data, self.clf.missing_label())?;
        let utilities = uncertainty_utilities(self.clf.as_ref(), candidates, data)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ParzenWindowClassifier;
    use crate::error::Error;

    fn data() -> DelayedTrainingData {
        DelayedTrainingData::new(
            vec![vec![0.0], vec![10.0]],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0],
            vec![true, true],
        )
    }

    fn strategy(budget: f64) -> FixedUncertainty {
        FixedUncertainty::new(
            FixedUncertaintyConfig {
                budget: FixedBudgetConfig { budget },
            },
            Box::new(ParzenWindowClassifier::with_classes(2).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn midpoint_is_most_uncertain() {
        let mut qs = strategy(0.1);
        let cands = StreamCandidates::new(
            vec![vec![5.0], vec![0.0]],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
        );
        let r = qs.query(&cands, &data(), true).unwrap();
        assert!((r.utilities[0] - 1.0).abs() < 1e-9);
        assert!(r.utilities[1] < 1e-6);
    }

    #[test]
    fn committed_query_equals_simulated_query_plus_update() {
        let cands = StreamCandidates::new(
            (0..12).map(|i| vec![i as f64 * 0.9]).collect(),
            vec![3.0; 12],
            vec![4.0; 12],
        );
        let mut committed = strategy(0.5);
        let r = committed.query(&cands, &data(), false).unwrap();

        let mut simulated = strategy(0.5);
        let before = simulated.budget_manager().state();
        let rs = simulated.query(&cands, &data(), true).unwrap();
        assert_eq!(simulated.budget_manager().state(), before);
        simulated.update(&cands, &rs.sampled, Some(&rs.utilities)).unwrap();

        assert_eq!(r, rs);
        assert_eq!(committed.budget_manager().state(), simulated.budget_manager().state());
    }

    #[test]
    fn feature_count_mismatch_is_rejected() {
        let mut qs = strategy(0.1);
        let cands = StreamCandidates::new(vec![vec![1.0, 2.0]], vec![2.0], vec![3.0]);
        assert!(matches!(
            qs.query(&cands, &data(), true),
            Err(Error::InvalidShape(_))
        ));
    }

    #[test]
    fn update_rejects_unknown_candidates() {
        let mut qs = strategy(0.1);
        let cands = StreamCandidates::new(vec![vec![1.0]], vec![2.0], vec![3.0]);
        assert!(qs.update(&cands, &[1], None).is_err());
    }
}
