mod estimators;
mod preview;

pub use estimators::{BasicEstimator, Estimator};
pub use preview::{CurveFormat, LearningCurve, Snapshot};
