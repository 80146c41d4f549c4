use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid label {label} at row {row}: {reason}")]
    InvalidLabel {
        row: usize,
        label: f64,
        reason: &'static str,
    },

    #[error("invalid timestamp in {what} at position {position}")]
    InvalidTimestamp { what: &'static str, position: usize },

    #[error("index {index} out of bounds for {what} of length {len}")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("missing label mismatch: classifier uses {classifier}, strategy uses {strategy}")]
    MissingLabelMismatch { classifier: String, strategy: String },

    #[error("classifier does not provide {0}")]
    MissingCapability(&'static str),

    #[error("classifier used before fit")]
    NotFitted,

    #[error("invalid sampling distribution: {0}")]
    InvalidDistribution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
