use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub instances_seen: u64,
    pub accuracy: f64,
    pub labels_acquired: u64,
    pub seconds: f64,
}

impl Snapshot {
    /// Fraction of the seen instances whose label was acquired.
    pub fn budget_used(&self) -> f64 {
        if self.instances_seen == 0 {
            0.0
        } else {
            self.labels_acquired as f64 / self.instances_seen as f64
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "seen={}, acc={:.6}, labels={} ({:.4}), t={:.3}s",
            self.instances_seen,
            self.accuracy,
            self.labels_acquired,
            self.budget_used(),
            self.seconds
        )
    }
}
