use crate::core::MissingLabel;
use crate::error::{Error, Result};

/// Checks that `x` is a rectangular matrix of finite values and returns its
/// number of columns (0 for an empty matrix).
pub fn check_matrix(x: &[Vec<f64>], what: &'static str) -> Result<usize> {
    let Some(first) = x.first() else {
        return Ok(0);
    };
    let n_features = first.len();
    for (row, values) in x.iter().enumerate() {
        if values.len() != n_features {
            return Err(Error::InvalidShape(format!(
                "{what} row {row} has {} features, expected {n_features}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidShape(format!(
                "{what} row {row} contains non-finite values"
            )));
        }
    }
    Ok(n_features)
}

#[inline]
pub fn check_consistent_length(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::LengthMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

pub fn check_timestamps(t: &[f64], what: &'static str) -> Result<()> {
    match t.iter().position(|v| v.is_nan()) {
        Some(position) => Err(Error::InvalidTimestamp { what, position }),
        None => Ok(()),
    }
}

/// Every non-missing label must be a non-negative integer class index, and
/// below `n_classes` when the class count is known.
pub fn check_labels(y: &[f64], missing_label: MissingLabel, n_classes: Option<usize>) -> Result<()> {
    for (row, &label) in y.iter().enumerate() {
        if missing_label.is_missing(label) {
            continue;
        }
        if !label.is_finite() || label < 0.0 || label.fract() != 0.0 {
            return Err(Error::InvalidLabel {
                row,
                label,
                reason: "labels must be non-negative class indices",
            });
        }
        if let Some(n) = n_classes {
            if label as usize >= n {
                return Err(Error::InvalidLabel {
                    row,
                    label,
                    reason: "label exceeds the number of classes",
                });
            }
        }
    }
    Ok(())
}

pub fn check_sample_weight(sample_weight: &[f64], n_samples: usize) -> Result<()> {
    check_consistent_length("sample_weight", n_samples, sample_weight.len())?;
    if let Some(i) = sample_weight.iter().position(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidParameter(format!(
            "sample_weight[{i}] must be finite and non-negative"
        )));
    }
    Ok(())
}

pub fn check_equal_missing_label(classifier: MissingLabel, strategy: MissingLabel) -> Result<()> {
    if classifier != strategy {
        return Err(Error::MissingLabelMismatch {
            classifier: classifier.to_string(),
            strategy: strategy.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_shape_checks() {
        assert_eq!(check_matrix(&[], "X").unwrap(), 0);
        assert_eq!(check_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]], "X").unwrap(), 2);
        assert!(matches!(
            check_matrix(&[vec![1.0, 2.0], vec![3.0]], "X"),
            Err(Error::InvalidShape(_))
        ));
        assert!(matches!(
            check_matrix(&[vec![f64::NAN]], "X"),
            Err(Error::InvalidShape(_))
        ));
    }

    #[test]
    fn timestamps_reject_nan() {
        assert!(check_timestamps(&[0.0, 1.0, f64::INFINITY], "tX").is_ok());
        let err = check_timestamps(&[0.0, f64::NAN], "ty").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTimestamp {
                what: "ty",
                position: 1
            }
        ));
    }

    #[test]
    fn labels_must_be_class_indices() {
        let ml = MissingLabel::Nan;
        assert!(check_labels(&[0.0, 1.0, f64::NAN], ml, Some(2)).is_ok());
        assert!(check_labels(&[0.5], ml, None).is_err());
        assert!(check_labels(&[-1.0], ml, None).is_err());
        assert!(check_labels(&[2.0], ml, Some(2)).is_err());
        assert!(check_labels(&[-1.0, 0.0], MissingLabel::Value(-1.0), Some(1)).is_ok());
    }

    #[test]
    fn sample_weight_length_and_sign() {
        assert!(check_sample_weight(&[1.0, 0.5], 2).is_ok());
        assert!(matches!(
            check_sample_weight(&[1.0], 2),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(check_sample_weight(&[1.0, -0.1], 2).is_err());
    }

    #[test]
    fn missing_label_mismatch_is_reported() {
        assert!(check_equal_missing_label(MissingLabel::Nan, MissingLabel::Nan).is_ok());
        let err = check_equal_missing_label(MissingLabel::Value(-1.0), MissingLabel::Nan).unwrap_err();
        assert!(matches!(err, Error::MissingLabelMismatch { .. }));
    }
}
