mod stubs;

pub use stubs::{
    FixedProbaClassifier, RecordedQuery, RecordingHandle, RecordingStrategy, VecStream,
};
