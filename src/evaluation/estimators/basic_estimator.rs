use crate::evaluation::estimators::Estimator;

/// Streaming mean, used for 0/1 correctness indicators.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEstimator {
    count: u64,
    sum: f64,
}

impl Estimator for BasicEstimator {
    #[inline]
    fn add(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        self.count += 1;
        self.sum += v;
    }

    #[inline]
    fn estimation(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            f64::NAN
        }
    }

    #[inline]
    fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_ignores_nan() {
        let mut e = BasicEstimator::default();
        assert!(e.estimation().is_nan());
        for v in [1.0, f64::NAN, 0.0, 1.0, 1.0] {
            e.add(v);
        }
        assert_eq!(e.count(), 4);
        assert_eq!(e.estimation(), 0.75);
    }
}
