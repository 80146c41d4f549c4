pub mod classifier;
pub mod parzen_window;

pub use classifier::{Classifier, FrequencyClassifier};
pub use parzen_window::{ParzenWindowClassifier, ParzenWindowConfig};
