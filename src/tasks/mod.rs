mod delayed_prequential;

pub use delayed_prequential::{DelayedPrequentialConfig, DelayedPrequentialEvaluator};
