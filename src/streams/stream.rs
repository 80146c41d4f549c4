use crate::error::Result;

/// One instance produced by a stream: its features and its true class.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub x: Vec<f64>,
    pub y: f64,
}

impl StreamRecord {
    pub fn new(x: Vec<f64>, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pull-based source of labeled instances.
///
/// Implementations may represent finite datasets or unbounded generators.
/// Every record of a stream has [`n_features`](Stream::n_features) features
/// and a class below [`n_classes`](Stream::n_classes).
pub trait Stream {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Indicates whether the stream *may* produce more records.
    ///
    /// If it returns `false`, a subsequent call to
    /// [`next_record`](Stream::next_record) must return `None`.
    fn has_more_instances(&self) -> bool;

    /// Produces the next record, or `None` if the stream is exhausted.
    fn next_record(&mut self) -> Option<StreamRecord>;

    /// Resets the stream to its initial state. Generators re-seed their RNG.
    fn restart(&mut self) -> Result<()>;
}
