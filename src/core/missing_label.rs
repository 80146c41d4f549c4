use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel marking an unlabeled row inside an otherwise uniform label vector.
///
/// Labels are class indices stored as `f64`, the same way instance values
/// carry their class. `Nan` matches any NaN label, `Value(v)` matches `v`
/// exactly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum MissingLabel {
    #[default]
    Nan,
    Value(f64),
}

impl MissingLabel {
    #[inline]
    pub fn is_missing(&self, label: f64) -> bool {
        match self {
            MissingLabel::Nan => label.is_nan(),
            MissingLabel::Value(v) => label == *v,
        }
    }

    /// The value written into label vectors for unlabeled rows.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            MissingLabel::Nan => f64::NAN,
            MissingLabel::Value(v) => *v,
        }
    }

    pub fn count_labeled(&self, y: &[f64]) -> usize {
        y.iter().filter(|&&label| !self.is_missing(label)).count()
    }

    pub fn unlabeled_indices(&self, y: &[f64]) -> Vec<usize> {
        y.iter()
            .enumerate()
            .filter(|(_, label)| self.is_missing(**label))
            .map(|(i, _)| i)
            .collect()
    }
}

impl PartialEq for MissingLabel {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MissingLabel::Nan, MissingLabel::Nan) => true,
            (MissingLabel::Value(a), MissingLabel::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for MissingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingLabel::Nan => write!(f, "nan"),
            MissingLabel::Value(v) => write!(f, "{v}"),
        }
    }
}
