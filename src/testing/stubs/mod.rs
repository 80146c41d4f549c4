mod fixed_proba_classifier;
mod recording_strategy;
mod vec_stream;

pub use fixed_proba_classifier::FixedProbaClassifier;
pub use recording_strategy::{RecordedQuery, RecordingHandle, RecordingStrategy};
pub use vec_stream::VecStream;
