use crate::classifiers::{Classifier, FrequencyClassifier};
use crate::core::MissingLabel;
use crate::core::validation::check_consistent_length;
use crate::error::{Error, Result};
use crate::utils::math::normalize;
use std::cell::Cell;
use std::rc::Rc;

/// Predicts the same class row for every instance and counts how often any
/// of its clones was fitted.
///
/// `predict_freq` returns the row as given, `predict_proba` its normalized
/// form. With embeddings enabled each instance is embedded as its features
/// followed by a constant `1.0`.
#[derive(Debug, Clone)]
pub struct FixedProbaClassifier {
    row: Vec<f64>,
    embeddings: bool,
    missing_label: MissingLabel,
    fitted: bool,
    fits: Rc<Cell<usize>>,
}

impl FixedProbaClassifier {
    pub fn new(row: Vec<f64>) -> Self {
        Self {
            row,
            embeddings: false,
            missing_label: MissingLabel::Nan,
            fitted: false,
            fits: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_embeddings(mut self) -> Self {
        self.embeddings = true;
        self
    }

    pub fn with_missing_label(mut self, missing_label: MissingLabel) -> Self {
        self.missing_label = missing_label;
        self
    }

    /// Fits performed by this classifier and all of its clones.
    pub fn fit_count(&self) -> usize {
        self.fits.get()
    }
}

impl Classifier for FixedProbaClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], _sample_weight: Option<&[f64]>) -> Result<()> {
        check_consistent_length("y", x.len(), y.len())?;
        self.fits.set(self.fits.get() + 1);
        self.fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let mut p = self.predict_freq(x)?;
        p.iter_mut().for_each(|row| normalize(row));
        Ok(p)
    }

    fn predict_proba_with_embeddings(
        &self,
        x: &[Vec<f64>],
    ) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
        if !self.embeddings {
            return Err(Error::MissingCapability("embeddings"));
        }
        let embeddings = x
            .iter()
            .map(|row| row.iter().copied().chain(std::iter::once(1.0)).collect())
            .collect();
        Ok((self.predict_proba(x)?, embeddings))
    }

    fn supports_embeddings(&self) -> bool {
        self.embeddings
    }

    fn missing_label(&self) -> MissingLabel {
        self.missing_label
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

impl FrequencyClassifier for FixedProbaClassifier {
    fn predict_freq(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(Error::NotFitted);
        }
        Ok(vec![self.row.clone(); x.len()])
    }

    fn boxed_clone_freq(&self) -> Box<dyn FrequencyClassifier> {
        Box::new(self.clone())
    }
}
