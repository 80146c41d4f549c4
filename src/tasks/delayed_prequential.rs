use crate::classifiers::Classifier;
use crate::core::validation::check_equal_missing_label;
use crate::core::{DelayedTrainingData, StreamCandidates};
use crate::error::{Error, Result};
use crate::evaluation::{BasicEstimator, Estimator, LearningCurve, Snapshot};
use crate::strategies::stream::StreamQueryStrategy;
use crate::streams::{Stream, StreamRecord};
use crate::utils::math::max_index;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::debug;

fn default_verification_delay() -> f64 {
    100.0
}
fn default_sample_frequency() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DelayedPrequentialConfig {
    #[serde(default = "default_verification_delay")]
    #[schemars(
        title = "Verification Delay",
        description = "Time steps between an instance and the arrival of its label",
        default = "default_verification_delay"
    )]
    pub verification_delay: f64,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Stop after this many instances (None = unlimited)"
    )]
    pub max_instances: Option<u64>,

    #[serde(default)]
    #[schemars(
        title = "Max Seconds",
        description = "Stop after this many seconds (None = unlimited)"
    )]
    pub max_seconds: Option<u64>,

    #[serde(default = "default_sample_frequency")]
    #[schemars(
        title = "Sample Frequency",
        description = "Emit metrics every N instances",
        range(min = 1),
        default = "default_sample_frequency"
    )]
    pub sample_frequency: u64,
}

impl Default for DelayedPrequentialConfig {
    fn default() -> Self {
        Self {
            verification_delay: default_verification_delay(),
            max_instances: None,
            max_seconds: None,
            sample_frequency: default_sample_frequency(),
        }
    }
}

/// Test-then-train evaluation of a stream query strategy when labels arrive
/// a fixed delay after their instance.
///
/// The instance seen at step `t` arrives at `tX = t`; its label, if
/// acquired, becomes usable at `ty = t + verification_delay`. Both the
/// classifier and the strategy only ever see labels that have arrived.
pub struct DelayedPrequentialEvaluator {
    classifier: Box<dyn Classifier>,
    strategy: Box<dyn StreamQueryStrategy>,
    stream: Box<dyn Stream>,
    config: DelayedPrequentialConfig,

    /// Everything seen so far, with labels masked until they arrive.
    history: DelayedTrainingData,
    /// Acquired labels still in transit: history row, label, arrival time.
    in_transit: VecDeque<(usize, f64, f64)>,
    accuracy: BasicEstimator,
    curve: LearningCurve,

    processed: u64,
    acquired: u64,
    start_time: Instant,

    progress_tx: Option<Sender<Snapshot>>,
}

impl DelayedPrequentialEvaluator {
    pub fn new(
        classifier: Box<dyn Classifier>,
        strategy: Box<dyn StreamQueryStrategy>,
        stream: Box<dyn Stream>,
        config: DelayedPrequentialConfig,
    ) -> Result<Self> {
        if config.sample_frequency == 0 {
            return Err(Error::InvalidParameter("sample_frequency must be > 0".into()));
        }
        if !config.verification_delay.is_finite() || config.verification_delay < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "verification_delay must be a finite number >= 0, got {}",
                config.verification_delay
            )));
        }
        check_equal_missing_label(classifier.missing_label(), strategy.missing_label())?;

        Ok(Self {
            classifier,
            strategy,
            stream,
            config,
            history: DelayedTrainingData::default(),
            in_transit: VecDeque::new(),
            accuracy: BasicEstimator::default(),
            curve: LearningCurve::default(),
            processed: 0,
            acquired: 0,
            start_time: Instant::now(),
            progress_tx: None,
        })
    }

    pub fn with_progress(mut self, tx: Sender<Snapshot>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();

        while self.stream.has_more_instances() {
            if let Some(n) = self.config.max_instances {
                if self.processed >= n {
                    break;
                }
            }
            if let Some(s) = self.config.max_seconds {
                if self.start_time.elapsed().as_secs() >= s {
                    break;
                }
            }
            let Some(record) = self.stream.next_record() else {
                break;
            };
            self.process(record)?;

            if self.processed % self.config.sample_frequency == 0 {
                self.push_snapshot();
            }
        }

        self.push_snapshot();
        Ok(())
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    pub fn strategy(&self) -> &dyn StreamQueryStrategy {
        self.strategy.as_ref()
    }

    fn process(&mut self, record: StreamRecord) -> Result<()> {
        let t = self.processed as f64;
        let ty = t + self.config.verification_delay;
        self.reveal_arrived(t);

        let correct = self.test(&record)?;
        self.accuracy.add(correct);

        let candidates = StreamCandidates::new(vec![record.x.clone()], vec![t], vec![ty]);
        let result = self.strategy.query(&candidates, &self.history, false)?;
        let acquired = !result.sampled.is_empty();
        if acquired {
            self.acquired += 1;
        }
        debug!(
            step = self.processed,
            utility = result.utilities.first().copied().unwrap_or(f64::NAN),
            acquired,
            "processed instance"
        );

        let missing = self.strategy.missing_label().value();
        if acquired {
            self.in_transit.push_back((self.history.len(), record.y, ty));
        }
        self.history.push(record.x, missing, t, ty, acquired, 1.0);
        self.processed += 1;
        Ok(())
    }

    /// Unmasks every acquired label with `ty <= t`. Arrival times grow with
    /// `t` since the delay is constant, so the queue is drained from the front.
    fn reveal_arrived(&mut self, t: f64) {
        while let Some(&(row, label, ty)) = self.in_transit.front() {
            if ty > t {
                break;
            }
            self.history.y[row] = label;
            self.in_transit.pop_front();
        }
    }

    /// 1 for a correct prediction, 0 for a wrong one, `NaN` while no label
    /// has arrived.
    fn test(&self, record: &StreamRecord) -> Result<f64> {
        let visible = &self.history;
        if self.strategy.missing_label().count_labeled(&visible.y) == 0 {
            return Ok(f64::NAN);
        }
        let mut model = self.classifier.boxed_clone();
        model.fit(&visible.x, &visible.y, visible.sample_weight.as_deref())?;
        let proba = model.predict_proba(std::slice::from_ref(&record.x))?;
        let predicted = proba.first().and_then(|p| max_index(p));
        Ok(match predicted {
            Some(c) if c as f64 == record.y => 1.0,
            _ => 0.0,
        })
    }

    fn push_snapshot(&mut self) {
        let snapshot = Snapshot {
            instances_seen: self.processed,
            accuracy: self.accuracy.estimation(),
            labels_acquired: self.acquired,
            seconds: self.start_time.elapsed().as_secs_f64(),
        };

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(snapshot);
        }
        self.curve.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::FixedBudgetConfig;
    use crate::classifiers::{ParzenWindowClassifier, ParzenWindowConfig};
    use crate::core::MissingLabel;
    use crate::strategies::stream::{RandomSamplingConfig, StreamRandomSampling};
    use crate::testing::{RecordingStrategy, VecStream};
    use std::sync::mpsc;

    fn alternating(n: usize) -> Box<dyn Stream> {
        Box::new(VecStream::new((0..n).map(|i| i % 2).collect()))
    }

    fn pwc() -> Box<dyn Classifier> {
        Box::new(ParzenWindowClassifier::with_classes(2).unwrap())
    }

    fn label_everything() -> Box<dyn StreamQueryStrategy> {
        Box::new(
            StreamRandomSampling::new(RandomSamplingConfig {
                budget: FixedBudgetConfig { budget: 1.0 },
                ..Default::default()
            })
            .unwrap(),
        )
    }

    fn config(delay: f64, sample_frequency: u64) -> DelayedPrequentialConfig {
        DelayedPrequentialConfig {
            verification_delay: delay,
            sample_frequency,
            ..Default::default()
        }
    }

    #[test]
    fn ctor_guards() {
        let err = DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(10), config(5.0, 0));
        assert!(matches!(err, Err(Error::InvalidParameter(_))));

        let err = DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(10), config(-1.0, 5));
        assert!(matches!(err, Err(Error::InvalidParameter(_))));

        let other = ParzenWindowClassifier::new(ParzenWindowConfig {
            missing_label: MissingLabel::Value(-1.0),
            ..Default::default()
        })
        .unwrap();
        let err = DelayedPrequentialEvaluator::new(
            Box::new(other),
            label_everything(),
            alternating(10),
            config(5.0, 5),
        );
        assert!(matches!(err, Err(Error::MissingLabelMismatch { .. })));
    }

    #[test]
    fn periodic_and_final_snapshots() {
        let mut pq =
            DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(100), config(5.0, 10))
                .unwrap();
        pq.run().unwrap();

        assert_eq!(pq.curve().len(), 11);
        let last = pq.curve().latest().unwrap();
        assert_eq!(last.instances_seen, 100);
        assert_eq!(last.labels_acquired, 100);
        assert!(last.accuracy > 0.98);
    }

    #[test]
    fn accuracy_is_undefined_until_first_label_arrives() {
        let mut pq =
            DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(5), config(10.0, 1))
                .unwrap();
        pq.run().unwrap();
        assert!(pq.curve().entries().iter().all(|s| s.accuracy.is_nan()));
        assert_eq!(pq.curve().latest().unwrap().labels_acquired, 5);
    }

    #[test]
    fn strategy_only_sees_arrived_labels() {
        let (strategy, handle) = RecordingStrategy::new();
        let mut pq =
            DelayedPrequentialEvaluator::new(pwc(), Box::new(strategy), alternating(12), config(3.0, 4))
                .unwrap();
        pq.run().unwrap();

        let calls = handle.calls();
        assert_eq!(calls.len(), 12);
        for (t, call) in calls.iter().enumerate() {
            assert!(!call.simulate);
            assert_eq!(call.y.len(), t);
            assert_eq!(call.tx, (0..t).map(|j| j as f64).collect::<Vec<_>>());
            assert_eq!(call.ty, (0..t).map(|j| j as f64 + 3.0).collect::<Vec<_>>());
            // labels are only ever revealed after ty <= t
            for (j, y) in call.y.iter().enumerate() {
                if j as f64 + 3.0 > t as f64 {
                    assert!(y.is_nan());
                }
            }
        }
        let acquired = pq.curve().latest().unwrap().labels_acquired;
        assert_eq!(acquired, pq.strategy().budget_manager().state().sampled);
    }

    #[test]
    fn labels_are_revealed_exactly_when_they_arrive() {
        let mut pq =
            DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(12), config(3.0, 4))
                .unwrap();
        pq.run().unwrap();

        // the last step ran at t = 11, so rows up to 8 have arrived
        for (j, y) in pq.history.y.iter().enumerate() {
            if j <= 8 {
                assert_eq!(*y, (j % 2) as f64);
            } else {
                assert!(y.is_nan());
            }
        }
        assert!(pq.history.acquisitions.iter().all(|&a| a));
        assert_eq!(pq.in_transit.len(), 3);
        assert_eq!(pq.in_transit.front().map(|e| e.0), Some(9));
    }

    #[test]
    fn stops_at_max_instances_and_reports_progress() {
        let (tx, rx) = mpsc::channel();
        let cfg = DelayedPrequentialConfig {
            max_instances: Some(25),
            ..config(2.0, 5)
        };
        let mut pq = DelayedPrequentialEvaluator::new(pwc(), label_everything(), alternating(1000), cfg)
            .unwrap()
            .with_progress(tx);
        pq.run().unwrap();

        assert_eq!(pq.curve().len(), 6);
        assert_eq!(pq.curve().latest().unwrap().instances_seen, 25);
        let sent: Vec<Snapshot> = rx.try_iter().collect();
        assert_eq!(sent.len(), 6);
        assert_eq!(sent[0].instances_seen, 5);
    }
}
