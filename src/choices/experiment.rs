use crate::choices::{StrategyChoice, StreamChoice, build_stream};
use crate::classifiers::{ParzenWindowClassifier, ParzenWindowConfig};
use crate::error::Result;
use crate::tasks::{DelayedPrequentialConfig, DelayedPrequentialEvaluator};
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A complete delayed-label experiment: where the data comes from, which
/// strategy decides what to label and how the run is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExperimentConfig {
    #[schemars(title = "Stream")]
    pub stream: StreamChoice,

    #[serde(default)]
    #[schemars(title = "Query strategy")]
    pub strategy: StrategyChoice,

    #[serde(default)]
    #[schemars(
        title = "Classifier",
        description = "Evaluated classifier, trained on arrived labels."
    )]
    pub classifier: ParzenWindowConfig,

    #[serde(default)]
    #[schemars(title = "Evaluation")]
    pub evaluation: DelayedPrequentialConfig,
}

impl ExperimentConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading experiment config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing experiment config {}", path.display()))
    }

    pub fn build(self) -> Result<DelayedPrequentialEvaluator> {
        let classifier = ParzenWindowClassifier::new(self.classifier)?;
        DelayedPrequentialEvaluator::new(
            Box::new(classifier),
            self.strategy.build()?,
            build_stream(self.stream)?,
            self.evaluation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::StrategyKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"{
        "stream": {"type": "sea-generator", "params": {"function": "f1", "max_instances": 60, "seed": 3}},
        "strategy": {
            "type": "bagging-delay",
            "params": {
                "k": 2,
                "base": {"type": "split", "params": {"budget": {"budget": 0.3}}}
            }
        },
        "classifier": {"n_classes": 2},
        "evaluation": {"verification_delay": 10.0, "sample_frequency": 20}
    }"#;

    #[test]
    fn loads_and_runs_a_small_experiment() {
        let mut tf = NamedTempFile::new().unwrap();
        tf.write_all(CONFIG.as_bytes()).unwrap();

        let config = ExperimentConfig::load(tf.path()).unwrap();
        assert_eq!(config.strategy.kind(), StrategyKind::BaggingDelay);
        assert_eq!(config.evaluation.max_instances, None);

        let mut evaluator = config.build().unwrap();
        evaluator.run().unwrap();
        let curve = evaluator.curve();
        assert_eq!(curve.len(), 4);
        let last = curve.latest().unwrap();
        assert_eq!(last.instances_seen, 60);
        assert!(last.labels_acquired <= 18);
        assert_eq!(
            last.labels_acquired,
            evaluator.strategy().budget_manager().state().sampled
        );
    }

    #[test]
    fn strategy_defaults_to_split() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"stream": {"type": "sea-generator", "params": {}}}"#).unwrap();
        assert_eq!(config.strategy.kind(), StrategyKind::Split);
        assert_eq!(config.evaluation, DelayedPrequentialConfig::default());
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = ExperimentConfig::load("/nonexistent/experiment.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/experiment.json"));
    }
}
