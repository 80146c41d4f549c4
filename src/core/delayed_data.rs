use crate::core::MissingLabel;
use crate::core::validation::{
    check_consistent_length, check_labels, check_matrix, check_sample_weight, check_timestamps,
};
use crate::error::Result;

/// Everything observed so far in a stream with verification latency.
///
/// Row `j` holds the features of instance `j`, its label (or the missing
/// label while it has not arrived), the time its features arrived (`tx`),
/// the time its label arrives or would arrive (`ty`) and whether a label was
/// requested for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DelayedTrainingData {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    pub tx: Vec<f64>,
    pub ty: Vec<f64>,
    pub acquisitions: Vec<bool>,
    pub sample_weight: Option<Vec<f64>>,
}

impl DelayedTrainingData {
    pub fn new(
        x: Vec<Vec<f64>>,
        y: Vec<f64>,
        tx: Vec<f64>,
        ty: Vec<f64>,
        acquisitions: Vec<bool>,
    ) -> Self {
        Self {
            x,
            y,
            tx,
            ty,
            acquisitions,
            sample_weight: None,
        }
    }

    pub fn with_sample_weight(mut self, sample_weight: Vec<f64>) -> Self {
        self.sample_weight = Some(sample_weight);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Validates shapes and returns the number of features.
    pub fn validate(&self, missing_label: MissingLabel) -> Result<usize> {
        let n_features = check_matrix(&self.x, "X")?;
        let n = self.x.len();
        check_consistent_length("y", n, self.y.len())?;
        check_consistent_length("tX", n, self.tx.len())?;
        check_consistent_length("ty", n, self.ty.len())?;
        check_consistent_length("acquisitions", n, self.acquisitions.len())?;
        check_timestamps(&self.tx, "tX")?;
        check_timestamps(&self.ty, "ty")?;
        check_labels(&self.y, missing_label, None)?;
        if let Some(w) = &self.sample_weight {
            check_sample_weight(w, n)?;
        }
        Ok(n_features)
    }

    /// Rows for which `mask` is set, in their original order.
    pub fn select(&self, mask: &[bool]) -> Self {
        let keep = |j: &usize| mask.get(*j).copied().unwrap_or(false);
        let idx: Vec<usize> = (0..self.len()).filter(keep).collect();
        Self {
            x: idx.iter().map(|&j| self.x[j].clone()).collect(),
            y: idx.iter().map(|&j| self.y[j]).collect(),
            tx: idx.iter().map(|&j| self.tx[j]).collect(),
            ty: idx.iter().map(|&j| self.ty[j]).collect(),
            acquisitions: idx.iter().map(|&j| self.acquisitions[j]).collect(),
            sample_weight: self
                .sample_weight
                .as_ref()
                .map(|w| idx.iter().map(|&j| w[j]).collect()),
        }
    }

    /// Explicit weights, or unit weights when none were given.
    pub fn sample_weight_or_ones(&self) -> Vec<f64> {
        self.sample_weight
            .clone()
            .unwrap_or_else(|| vec![1.0; self.len()])
    }

    /// Appends a row. Unit weights are materialized first if the data set
    /// had none and `weight` differs from one.
    pub fn push(&mut self, x: Vec<f64>, y: f64, tx: f64, ty: f64, acquired: bool, weight: f64) {
        if self.sample_weight.is_none() && weight != 1.0 {
            self.sample_weight = Some(vec![1.0; self.len()]);
        }
        if let Some(w) = self.sample_weight.as_mut() {
            w.push(weight);
        }
        self.x.push(x);
        self.y.push(y);
        self.tx.push(tx);
        self.ty.push(ty);
        self.acquisitions.push(acquired);
    }
}

/// Instances arriving from the stream that must be judged now.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamCandidates {
    pub x: Vec<Vec<f64>>,
    pub tx: Vec<f64>,
    pub ty: Vec<f64>,
}

impl StreamCandidates {
    pub fn new(x: Vec<Vec<f64>>, tx: Vec<f64>, ty: Vec<f64>) -> Self {
        Self { x, tx, ty }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The `i`-th candidate as a batch of one.
    pub fn single(&self, i: usize) -> Self {
        Self {
            x: vec![self.x[i].clone()],
            tx: vec![self.tx[i]],
            ty: vec![self.ty[i]],
        }
    }

    pub fn validate(&self) -> Result<usize> {
        let n_features = check_matrix(&self.x, "X_cand")?;
        check_consistent_length("tX_cand", self.x.len(), self.tx.len())?;
        check_consistent_length("ty_cand", self.x.len(), self.ty.len())?;
        check_timestamps(&self.tx, "tX_cand")?;
        check_timestamps(&self.ty, "ty_cand")?;
        Ok(n_features)
    }
}
