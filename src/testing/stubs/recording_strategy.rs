use crate::budget::{BudgetManager, FixedBudget};
use crate::core::{DelayedTrainingData, MissingLabel, StreamCandidates};
use crate::error::Result;
use crate::strategies::stream::{
    StreamQueryResult, StreamQueryStrategy, check_sampled, sample_and_commit,
};
use std::cell::RefCell;
use std::rc::Rc;

/// What a [`RecordingStrategy`] was asked to judge.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub simulate: bool,
    pub n_candidates: usize,
    pub y: Vec<f64>,
    pub tx: Vec<f64>,
    pub ty: Vec<f64>,
    pub sample_weight: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    calls: Rc<RefCell<Vec<RecordedQuery>>>,
}

impl RecordingHandle {
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.borrow().clone()
    }
}

/// Stream strategy that records every query and scores each candidate with
/// the mean of the labels it was shown (0 when none are labeled).
pub struct RecordingStrategy {
    budget_manager: FixedBudget,
    handle: RecordingHandle,
}

impl RecordingStrategy {
    pub fn new() -> (Self, RecordingHandle) {
        let handle = RecordingHandle::default();
        let strategy = Self {
            budget_manager: FixedBudget::default(),
            handle: handle.clone(),
        };
        (strategy, handle)
    }
}

impl StreamQueryStrategy for RecordingStrategy {
    fn query(
        &mut self,
        candidates: &StreamCandidates,
        data: &DelayedTrainingData,
        simulate: bool,
    ) -> Result<StreamQueryResult> {
        self.handle.calls.borrow_mut().push(RecordedQuery {
            simulate,
            n_candidates: candidates.len(),
            y: data.y.clone(),
            tx: data.tx.clone(),
            ty: data.ty.clone(),
            sample_weight: data.sample_weight.clone(),
        });
        let labeled: Vec<f64> = data
            .y
            .iter()
            .copied()
            .filter(|&v| !MissingLabel::Nan.is_missing(v))
            .collect();
        let utility = if labeled.is_empty() {
            0.0
        } else {
            labeled.iter().sum::<f64>() / labeled.len() as f64
        };
        sample_and_commit(self, candidates, vec![utility; candidates.len()], simulate)
    }

    fn update(
        &mut self,
        candidates: &StreamCandidates,
        sampled: &[usize],
        _utilities: Option<&[f64]>,
    ) -> Result<()> {
        check_sampled(candidates, sampled)?;
        self.budget_manager.update(candidates.len(), sampled)
    }

    fn budget_manager(&self) -> &dyn BudgetManager {
        &self.budget_manager
    }

    fn budget_manager_mut(&mut self) -> &mut dyn BudgetManager {
        &mut self.budget_manager
    }

    fn missing_label(&self) -> MissingLabel {
        MissingLabel::Nan
    }
}
