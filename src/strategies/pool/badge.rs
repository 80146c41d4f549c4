use crate::classifiers::Classifier;
use crate::core::MissingLabel;
use crate::core::validation::{check_consistent_length, check_equal_missing_label, check_labels, check_matrix};
use crate::error::{Error, Result};
use crate::strategies::pool::distance_probability;
use crate::utils::math::max_value;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BadgeConfig {
    #[serde(default)]
    #[schemars(title = "Missing label")]
    pub missing_label: MissingLabel,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            missing_label: MissingLabel::default(),
            seed: default_seed(),
        }
    }
}

/// Where BADGE looks for instances to query.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolCandidates {
    /// Every unlabeled row of `X`.
    Unlabeled,
    /// Rows of `X`; labeled ones among them are skipped.
    Indices(Vec<usize>),
    /// Instances outside `X`, all treated as unlabeled. Returned indices
    /// refer to this list.
    Samples(Vec<Vec<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeQuery {
    /// Selected instances in selection order.
    pub indices: Vec<usize>,
    /// Row `k` holds the selection probabilities used for the `k`-th pick.
    /// Labeled, non-candidate and already selected entries are NaN; a row of
    /// ones marks a uniform draw.
    pub utilities: Vec<Vec<f64>>,
}

/// Batch Active learning by Diverse Gradient Embeddings.
///
/// Each instance is embedded as `(p_max - 1) * embedding` and the batch is
/// drawn with k-means++ seeding over these vectors, which favours instances
/// that are both uncertain and far from what is already selected.
#[derive(Debug)]
pub struct Badge {
    missing_label: MissingLabel,
    rng: StdRng,
}

impl Badge {
    pub fn new(config: BadgeConfig) -> Self {
        Self {
            missing_label: config.missing_label,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn missing_label(&self) -> MissingLabel {
        self.missing_label
    }

    pub fn query(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        clf: &dyn Classifier,
        candidates: &PoolCandidates,
        batch_size: usize,
        return_embeddings: bool,
    ) -> Result<BadgeQuery> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter("batch_size must be >= 1".into()));
        }
        check_equal_missing_label(clf.missing_label(), self.missing_label)?;
        if return_embeddings && !clf.supports_embeddings() {
            return Err(Error::MissingCapability("embeddings"));
        }
        let n_features = check_matrix(x, "X")?;
        check_consistent_length("y", x.len(), y.len())?;
        check_labels(y, self.missing_label, None)?;

        let (pool, mapping, width) = self.unlabeled_pool(x, y, candidates, n_features)?;

        let batch_size = if batch_size > pool.len() {
            warn!(
                requested = batch_size,
                available = pool.len(),
                "batch_size exceeds the unlabeled pool, reducing it"
            );
            pool.len()
        } else {
            batch_size
        };
        if batch_size == 0 {
            return Ok(BadgeQuery {
                indices: Vec::new(),
                utilities: Vec::new(),
            });
        }

        let mut model = clf.boxed_clone();
        model.fit(x, y, None)?;
        let g_x = gradient_embedding(model.as_ref(), &pool, return_embeddings)?;

        let mut indices = Vec::with_capacity(batch_size);
        let mut utilities = Vec::with_capacity(batch_size);
        let mut selected = vec![false; pool.len()];
        let mut d_latest: Option<Vec<f64>> = None;
        let mut last: Option<usize> = None;

        for round in 0..batch_size {
            let chosen: Vec<usize> = last.into_iter().collect();
            let step = distance_probability(&g_x, &chosen, d_latest.as_deref())?;

            let mut row = vec![f64::NAN; width];
            for (j, &m) in mapping.iter().enumerate() {
                row[m] = step.probabilities[j];
            }
            for &q in &indices {
                row[q] = f64::NAN;
            }

            let pick = if step.randomized {
                let remaining: Vec<usize> = (0..pool.len()).filter(|&j| !selected[j]).collect();
                remaining[self.rng.random_range(0..remaining.len())]
            } else {
                WeightedIndex::new(&step.probabilities)
                    .map_err(|e| Error::InvalidDistribution(e.to_string()))?
                    .sample(&mut self.rng)
            };
            debug!(round, randomized = step.randomized, pick = mapping[pick], "badge selection");

            selected[pick] = true;
            last = Some(pick);
            d_latest = step.min_distances;
            indices.push(mapping[pick]);
            utilities.push(row);
        }

        Ok(BadgeQuery { indices, utilities })
    }

    /// Unlabeled instances, their index in the output space and the width of
    /// a utility row.
    fn unlabeled_pool(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        candidates: &PoolCandidates,
        n_features: usize,
    ) -> Result<(Vec<Vec<f64>>, Vec<usize>, usize)> {
        match candidates {
            PoolCandidates::Unlabeled => {
                let mapping = self.missing_label.unlabeled_indices(y);
                let pool = mapping.iter().map(|&i| x[i].clone()).collect();
                Ok((pool, mapping, x.len()))
            }
            PoolCandidates::Indices(idx) => {
                if let Some(&index) = idx.iter().find(|&&i| i >= x.len()) {
                    return Err(Error::IndexOutOfBounds {
                        what: "X",
                        index,
                        len: x.len(),
                    });
                }
                let mut seen = vec![false; x.len()];
                for &i in idx {
                    if std::mem::replace(&mut seen[i], true) {
                        return Err(Error::InvalidParameter(format!(
                            "candidate index {i} is listed more than once"
                        )));
                    }
                }
                let mapping: Vec<usize> = idx
                    .iter()
                    .copied()
                    .filter(|&i| self.missing_label.is_missing(y[i]))
                    .collect();
                let pool = mapping.iter().map(|&i| x[i].clone()).collect();
                Ok((pool, mapping, x.len()))
            }
            PoolCandidates::Samples(samples) => {
                let cand_features = check_matrix(samples, "candidates")?;
                if !samples.is_empty() && !x.is_empty() && cand_features != n_features {
                    return Err(Error::InvalidShape(format!(
                        "candidates have {cand_features} features, X has {n_features}"
                    )));
                }
                Ok((samples.clone(), (0..samples.len()).collect(), samples.len()))
            }
        }
    }
}

/// `(p_max - 1) * embedding` for every pool instance.
fn gradient_embedding(
    model: &dyn Classifier,
    pool: &[Vec<f64>],
    return_embeddings: bool,
) -> Result<Vec<Vec<f64>>> {
    let (probas, embeddings) = if return_embeddings {
        model.predict_proba_with_embeddings(pool)?
    } else {
        (model.predict_proba(pool)?, pool.to_vec())
    };
    check_consistent_length("probabilities", pool.len(), probas.len())?;
    check_consistent_length("embeddings", pool.len(), embeddings.len())?;
    if probas.iter().any(|p| p.is_empty()) {
        return Err(Error::InvalidDistribution(
            "classifier predicts no class; fit it on a labeled instance or configure n_classes"
                .into(),
        ));
    }

    Ok(probas
        .iter()
        .zip(embeddings)
        .map(|(p, emb)| {
            let scale = max_value(p) - 1.0;
            emb.into_iter().map(|v| scale * v).collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{ParzenWindowClassifier, ParzenWindowConfig};
    use crate::testing::FixedProbaClassifier;
    use std::collections::HashSet;

    fn five_points() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0],
        ];
        let y = vec![0.0, f64::NAN, f64::NAN, f64::NAN, 1.0];
        (x, y)
    }

    fn pwc() -> ParzenWindowClassifier {
        ParzenWindowClassifier::with_classes(2).unwrap()
    }

    #[test]
    fn two_round_scenario_on_five_points() {
        let (x, y) = five_points();
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 2, false)
            .unwrap();

        assert_eq!(q.indices.len(), 2);
        assert_ne!(q.indices[0], q.indices[1]);
        assert!(q.indices.iter().all(|i| [1, 2, 3].contains(i)));

        let first = &q.utilities[0];
        assert!(first[0].is_nan() && first[4].is_nan());
        assert_eq!(&first[1..4], &[1.0, 1.0, 1.0]);

        let second = &q.utilities[1];
        assert!(second[q.indices[0]].is_nan());
        for i in [1, 2, 3] {
            if i != q.indices[0] {
                assert!(second[i] > 0.0, "utility of {i} should be positive");
            }
        }
    }

    #[test]
    fn second_round_probability_is_zero_for_first_pick() {
        let (x, y) = five_points();
        let mut clf = pwc();
        clf.fit(&x, &y, None).unwrap();
        let pool: Vec<Vec<f64>> = vec![x[1].clone(), x[2].clone(), x[3].clone()];
        let g_x = gradient_embedding(&clf, &pool, false).unwrap();

        let round0 = distance_probability(&g_x, &[], None).unwrap();
        assert!(round0.randomized);
        assert_eq!(round0.probabilities, vec![1.0; 3]);

        for pick in 0..3 {
            let round1 = distance_probability(&g_x, &[pick], None).unwrap();
            assert!(!round1.randomized);
            assert_eq!(round1.probabilities[pick], 0.0);
            for j in (0..3).filter(|&j| j != pick) {
                assert!(round1.probabilities[j] > 0.0);
            }
        }
    }

    #[test]
    fn returns_distinct_indices_from_the_pool() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 * 0.5, (i % 7) as f64]).collect();
        let mut y = vec![f64::NAN; 20];
        y[0] = 0.0;
        y[19] = 1.0;
        y[10] = 1.0;
        for seed in 0..25 {
            let mut badge = Badge::new(BadgeConfig {
                seed,
                ..BadgeConfig::default()
            });
            let q = badge
                .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 6, false)
                .unwrap();
            let unique: HashSet<usize> = q.indices.iter().copied().collect();
            assert_eq!(q.indices.len(), 6);
            assert_eq!(unique.len(), 6);
            assert!(q.indices.iter().all(|&i| y[i].is_nan()));
            assert_eq!(q.utilities.len(), 6);
            assert!(q.utilities.iter().all(|row| row.len() == 20));
        }
    }

    #[test]
    fn non_randomized_rows_sum_to_one() {
        let (x, y) = five_points();
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 3, false)
            .unwrap();
        // the first pick is NaN in the second row but had probability zero
        let sum: f64 = q.utilities[1].iter().filter(|v| !v.is_nan()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collapsed_classifier_falls_back_to_uniform_and_stays_distinct() {
        let x: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let y = vec![0.0, f64::NAN, f64::NAN, f64::NAN];
        let clf = FixedProbaClassifier::new(vec![1.0, 0.0]);
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &clf, &PoolCandidates::Unlabeled, 3, false)
            .unwrap();

        let mut picked = q.indices.clone();
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3]);
        for (round, row) in q.utilities.iter().enumerate() {
            assert!(row[0].is_nan());
            for &earlier in &q.indices[..round] {
                assert!(row[earlier].is_nan());
            }
            let ones = row.iter().filter(|v| **v == 1.0).count();
            assert_eq!(ones, 3 - round);
        }
    }

    #[test]
    fn index_candidates_skip_labeled_rows() {
        let (x, y) = five_points();
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Indices(vec![0, 1, 2]), 2, false)
            .unwrap();
        let mut picked = q.indices.clone();
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2]);
        assert!(q.utilities[0][3].is_nan());
        assert!(q.utilities[0][0].is_nan());
    }

    #[test]
    fn sample_candidates_index_into_candidates() {
        let (x, y) = five_points();
        let cands = vec![vec![0.5, 0.5], vec![3.5, 3.5]];
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Samples(cands), 2, false)
            .unwrap();
        let mut picked = q.indices.clone();
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1]);
        assert_eq!(q.utilities[0].len(), 2);
    }

    #[test]
    fn batch_size_is_reduced_to_pool_size() {
        let (x, y) = five_points();
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 10, false)
            .unwrap();
        assert_eq!(q.indices.len(), 3);
    }

    #[test]
    fn uses_classifier_embeddings_when_requested() {
        let (x, y) = five_points();
        let clf = FixedProbaClassifier::new(vec![0.6, 0.4]).with_embeddings();
        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &clf, &PoolCandidates::Unlabeled, 2, true)
            .unwrap();
        assert_eq!(q.indices.len(), 2);
        assert_eq!(clf.fit_count(), 1);
    }

    #[test]
    fn configuration_errors_fail_before_fitting() {
        let (x, y) = five_points();
        let mut badge = Badge::new(BadgeConfig::default());

        let err = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 0, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 1, true)
            .unwrap_err();
        assert!(matches!(err, Error::MissingCapability("embeddings")));

        let other = ParzenWindowClassifier::new(ParzenWindowConfig {
            n_classes: Some(2),
            missing_label: MissingLabel::Value(-1.0),
            ..Default::default()
        })
        .unwrap();
        let err = badge
            .query(&x, &y, &other, &PoolCandidates::Unlabeled, 1, false)
            .unwrap_err();
        assert!(matches!(err, Error::MissingLabelMismatch { .. }));

        let clf = FixedProbaClassifier::new(vec![0.5, 0.5]);
        let err = badge
            .query(&x, &y, &clf, &PoolCandidates::Indices(vec![7]), 1, false)
            .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 7, .. }));
        assert_eq!(clf.fit_count(), 0);
    }

    #[test]
    fn repeated_candidate_indices_are_rejected() {
        let (x, y) = five_points();
        let clf = FixedProbaClassifier::new(vec![0.5, 0.5]);
        for seed in 0..5 {
            let mut badge = Badge::new(BadgeConfig {
                seed,
                ..BadgeConfig::default()
            });
            let err = badge
                .query(&x, &y, &clf, &PoolCandidates::Indices(vec![1, 1, 2]), 3, false)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
        }
        assert_eq!(clf.fit_count(), 0);

        let mut badge = Badge::new(BadgeConfig::default());
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Indices(vec![1, 2, 3]), 3, false)
            .unwrap();
        let unique: HashSet<usize> = q.indices.iter().copied().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn classifier_without_classes_is_reported() {
        let (x, _) = five_points();
        let y = vec![f64::NAN; 5];
        let clf = ParzenWindowClassifier::new(ParzenWindowConfig::default()).unwrap();
        let mut badge = Badge::new(BadgeConfig::default());
        let err = badge
            .query(&x, &y, &clf, &PoolCandidates::Unlabeled, 2, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDistribution(_)));

        // with a configured class count the same pool is fine
        let q = badge
            .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 2, false)
            .unwrap();
        assert_eq!(q.indices.len(), 2);
    }

    #[test]
    fn same_seed_same_batch() {
        let (x, y) = five_points();
        let run = |seed| {
            let mut badge = Badge::new(BadgeConfig {
                seed,
                ..BadgeConfig::default()
            });
            badge
                .query(&x, &y, &pwc(), &PoolCandidates::Unlabeled, 3, false)
                .unwrap()
                .indices
        };
        assert_eq!(run(7), run(7));
    }
}
