use crate::core::MissingLabel;
use crate::error::{Error, Result};

/// Batch classifier consumed by the query strategies.
///
/// `fit` replaces any previous model. Rows whose label matches
/// [`missing_label`](Classifier::missing_label) are skipped by the
/// classifier, so callers pass the full training set.
pub trait Classifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], sample_weight: Option<&[f64]>) -> Result<()>;

    /// One probability row per instance, `n_classes` columns.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Probabilities plus the classifier's own representation of each
    /// instance. Only available when [`supports_embeddings`] is true.
    ///
    /// [`supports_embeddings`]: Classifier::supports_embeddings
    fn predict_proba_with_embeddings(
        &self,
        _x: &[Vec<f64>],
    ) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
        Err(Error::MissingCapability("embeddings"))
    }

    fn supports_embeddings(&self) -> bool {
        false
    }

    fn missing_label(&self) -> MissingLabel;

    fn boxed_clone(&self) -> Box<dyn Classifier>;
}

/// Classifier that also reports per-class kernel frequencies, the raw counts
/// its probabilities are derived from.
pub trait FrequencyClassifier: Classifier {
    fn predict_freq(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    fn boxed_clone_freq(&self) -> Box<dyn FrequencyClassifier>;
}
