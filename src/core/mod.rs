mod delayed_data;
mod missing_label;
pub mod validation;

pub use delayed_data::{DelayedTrainingData, StreamCandidates};
pub use missing_label::MissingLabel;
