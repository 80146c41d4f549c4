use crate::classifiers::{Classifier, FrequencyClassifier};
use crate::core::MissingLabel;
use crate::core::validation::{check_consistent_length, check_labels, check_matrix, check_sample_weight};
use crate::error::{Error, Result};
use crate::utils::math::{normalize, squared_euclidean};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_class_prior() -> f64 {
    0.0
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ParzenWindowConfig {
    #[serde(default)]
    #[schemars(
        title = "Number of classes",
        description = "Inferred from the largest observed label when omitted."
    )]
    pub n_classes: Option<usize>,

    #[serde(default)]
    #[schemars(
        title = "Gamma",
        description = "RBF kernel width; 1 / n_features when omitted."
    )]
    pub gamma: Option<f64>,

    #[serde(default = "default_class_prior")]
    #[schemars(
        title = "Class prior",
        description = "Added to every class frequency before normalizing.",
        default = "default_class_prior"
    )]
    pub class_prior: f64,

    #[serde(default)]
    #[schemars(title = "Missing label")]
    pub missing_label: MissingLabel,
}

#[derive(Debug, Clone)]
struct FittedWindow {
    x: Vec<Vec<f64>>,
    class_index: Vec<usize>,
    weight: Vec<f64>,
    n_classes: usize,
    gamma: f64,
}

/// Parzen window classifier with an RBF kernel.
///
/// Class frequencies are the weighted kernel sums over labeled training rows
/// of each class; probabilities add `class_prior` and normalize.
#[derive(Debug, Clone)]
pub struct ParzenWindowClassifier {
    config: ParzenWindowConfig,
    fitted: Option<FittedWindow>,
}

impl ParzenWindowClassifier {
    pub fn new(config: ParzenWindowConfig) -> Result<Self> {
        if let Some(g) = config.gamma {
            if !g.is_finite() || g <= 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "gamma must be a finite number > 0, got {g}"
                )));
            }
        }
        if !config.class_prior.is_finite() || config.class_prior < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "class_prior must be a finite number >= 0, got {}",
                config.class_prior
            )));
        }
        if config.n_classes == Some(0) {
            return Err(Error::InvalidParameter("n_classes must be > 0".into()));
        }
        Ok(Self {
            config,
            fitted: None,
        })
    }

    pub fn with_classes(n_classes: usize) -> Result<Self> {
        Self::new(ParzenWindowConfig {
            n_classes: Some(n_classes),
            ..ParzenWindowConfig::default()
        })
    }

    pub fn config(&self) -> &ParzenWindowConfig {
        &self.config
    }

    /// Class count of the fitted model.
    pub fn n_classes(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_classes)
    }

    fn fitted(&self) -> Result<&FittedWindow> {
        self.fitted.as_ref().ok_or(Error::NotFitted)
    }
}

impl Classifier for ParzenWindowClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64], sample_weight: Option<&[f64]>) -> Result<()> {
        let n_features = check_matrix(x, "X")?;
        check_consistent_length("y", x.len(), y.len())?;
        if let Some(w) = sample_weight {
            check_sample_weight(w, y.len())?;
        }
        let missing = self.config.missing_label;
        check_labels(y, missing, self.config.n_classes)?;

        let mut fitted = FittedWindow {
            x: Vec::new(),
            class_index: Vec::new(),
            weight: Vec::new(),
            n_classes: self.config.n_classes.unwrap_or(0),
            gamma: self
                .config
                .gamma
                .unwrap_or(1.0 / n_features.max(1) as f64),
        };
        for (j, &label) in y.iter().enumerate() {
            if missing.is_missing(label) {
                continue;
            }
            let class = label as usize;
            if self.config.n_classes.is_none() {
                fitted.n_classes = fitted.n_classes.max(class + 1);
            }
            fitted.x.push(x[j].clone());
            fitted.class_index.push(class);
            fitted.weight.push(sample_weight.map_or(1.0, |w| w[j]));
        }
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let prior = self.config.class_prior;
        Ok(self
            .predict_freq(x)?
            .into_iter()
            .map(|row| {
                let mut p: Vec<f64> = row.into_iter().map(|f| f + prior).collect();
                normalize(&mut p);
                p
            })
            .collect())
    }

    fn missing_label(&self) -> MissingLabel {
        self.config.missing_label
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

impl FrequencyClassifier for ParzenWindowClassifier {
    fn predict_freq(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let fitted = self.fitted()?;
        check_matrix(x, "X")?;
        Ok(x.iter()
            .map(|sample| {
                let mut freq = vec![0.0; fitted.n_classes];
                for ((train, &class), &w) in fitted
                    .x
                    .iter()
                    .zip(&fitted.class_index)
                    .zip(&fitted.weight)
                {
                    freq[class] += w * (-fitted.gamma * squared_euclidean(sample, train)).exp();
                }
                freq
            })
            .collect())
    }

    fn boxed_clone_freq(&self) -> Box<dyn FrequencyClassifier> {
        Box::new(self.clone())
    }
}
