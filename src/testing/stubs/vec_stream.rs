use crate::error::Result;
use crate::streams::{Stream, StreamRecord};

/// Finite stream over fixed labels whose single feature equals the label.
pub struct VecStream {
    pub labels: Vec<usize>,
    n_classes: usize,
    idx: usize,
}

impl VecStream {
    pub fn new(labels: Vec<usize>) -> Self {
        let n_classes = labels.iter().max().map_or(1, |m| m + 1);
        Self {
            labels,
            n_classes,
            idx: 0,
        }
    }
}

impl Stream for VecStream {
    fn n_features(&self) -> usize {
        1
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn has_more_instances(&self) -> bool {
        self.idx < self.labels.len()
    }

    fn next_record(&mut self) -> Option<StreamRecord> {
        if !self.has_more_instances() {
            return None;
        }

        let y = self.labels[self.idx] as f64;
        self.idx += 1;
        Some(StreamRecord::new(vec![y], y))
    }

    fn restart(&mut self) -> Result<()> {
        self.idx = 0;
        Ok(())
    }
}
