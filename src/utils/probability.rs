use crate::error::{Error, Result};
use crate::utils::math::normalize;

/// Turns class-frequency estimates into class probabilities by adding a
/// constant prior to every class and renormalizing each row.
///
/// A class never observed near an instance keeps probability
/// `prior / (total + n_classes * prior)`. Rows that are all zero with a zero
/// prior become uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityCorrector {
    prior: f64,
}

impl ProbabilityCorrector {
    pub fn new(prior: f64) -> Result<Self> {
        if !prior.is_finite() || prior < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "delay_prior must be a finite number >= 0, got {prior}"
            )));
        }
        Ok(Self { prior })
    }

    #[inline]
    pub fn prior(&self) -> f64 {
        self.prior
    }

    pub fn correct(&self, frequencies: &[Vec<f64>]) -> Vec<Vec<f64>> {
        frequencies
            .iter()
            .map(|row| {
                let mut p: Vec<f64> = row.iter().map(|f| f + self.prior).collect();
                normalize(&mut p);
                p
            })
            .collect()
    }
}
