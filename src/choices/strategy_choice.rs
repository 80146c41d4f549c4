use crate::classifiers::{FrequencyClassifier, ParzenWindowClassifier, ParzenWindowConfig};
use crate::error::Result;
use crate::strategies::stream::verification_latency::{
    BaggingDelayConfig, BaggingDelaySimulator, ForgettingWindowConfig, ForgettingWindowWrapper,
    FuzzyDelayConfig, FuzzyDelaySimulator,
};
use crate::strategies::stream::{
    FixedUncertainty, FixedUncertaintyConfig, RandomSamplingConfig, Split, SplitConfig,
    StreamQueryStrategy, StreamRandomSampling,
};
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct UncertaintyParams {
    #[serde(flatten)]
    pub strategy: FixedUncertaintyConfig,

    #[serde(default)]
    #[schemars(title = "Classifier")]
    pub classifier: ParzenWindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct SplitParams {
    #[serde(flatten)]
    pub strategy: SplitConfig,

    #[serde(default)]
    #[schemars(title = "Classifier")]
    pub classifier: ParzenWindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ForgettingWindowParams {
    #[serde(flatten)]
    pub window: ForgettingWindowConfig,

    #[serde(default)]
    #[schemars(
        title = "Base strategy",
        description = "Wrapped strategy; split when omitted."
    )]
    pub base: Option<Box<StrategyChoice>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct BaggingDelayParams {
    #[serde(flatten)]
    pub simulator: BaggingDelayConfig,

    #[serde(default)]
    #[schemars(
        title = "Base strategy",
        description = "Wrapped strategy; split when omitted."
    )]
    pub base: Option<Box<StrategyChoice>>,

    #[serde(default)]
    #[schemars(
        title = "Label model",
        description = "Parzen window estimating pending labels; defaults when omitted."
    )]
    pub classifier: Option<ParzenWindowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct FuzzyDelayParams {
    #[serde(flatten)]
    pub simulator: FuzzyDelayConfig,

    #[serde(default)]
    #[schemars(
        title = "Base strategy",
        description = "Wrapped strategy; split when omitted."
    )]
    pub base: Option<Box<StrategyChoice>>,

    #[serde(default)]
    #[schemars(
        title = "Label model",
        description = "Parzen window estimating pending labels; defaults when omitted."
    )]
    pub classifier: Option<ParzenWindowConfig>,
}

/// A stream query strategy, possibly a stack of delay wrappers around a base
/// strategy, as written in configuration files:
///
/// ```json
/// {"type": "bagging-delay", "params": {"k": 4, "base": {"type": "split", "params": {}}}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StrategyKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum StrategyChoice {
    #[strum_discriminants(strum(
        message = "Random Sampling",
        detailed_message = "Uniformly random utilities."
    ))]
    RandomSampling(RandomSamplingConfig),

    #[strum_discriminants(strum(
        message = "Fixed Uncertainty",
        detailed_message = "Queries instances whose top class probability is below a budget-derived threshold."
    ))]
    FixedUncertainty(UncertaintyParams),

    #[strum_discriminants(strum(
        message = "Split",
        detailed_message = "Random utility with probability v, uncertainty otherwise."
    ))]
    Split(SplitParams),

    #[strum_discriminants(strum(
        message = "Forgetting Window",
        detailed_message = "Restricts the base strategy to recent training data."
    ))]
    ForgettingWindow(ForgettingWindowParams),

    #[strum_discriminants(strum(
        message = "Bagging Delay Simulator",
        detailed_message = "Averages base utilities over sampled pending labels."
    ))]
    BaggingDelay(BaggingDelayParams),

    #[strum_discriminants(strum(
        message = "Fuzzy Delay Simulator",
        detailed_message = "Adds pending labels as probability-weighted pseudo-instances."
    ))]
    FuzzyDelay(FuzzyDelayParams),
}

impl Default for StrategyChoice {
    fn default() -> Self {
        StrategyChoice::Split(SplitParams::default())
    }
}

impl StrategyChoice {
    pub fn kind(&self) -> StrategyKind {
        self.into()
    }

    /// Builds a choice from its type tag and `params` object.
    pub fn from_parts(kind: StrategyKind, params: Value) -> anyhow::Result<Self> {
        let key: &'static str = kind.into();
        let v = json!({ "type": key, "params": params });
        serde_json::from_value(v).with_context(|| format!("invalid params for {key}"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading strategy config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing strategy config {}", path.display()))
    }

    pub fn build(self) -> Result<Box<dyn StreamQueryStrategy>> {
        build_stream_strategy(self)
    }
}

pub fn build_stream_strategy(choice: StrategyChoice) -> Result<Box<dyn StreamQueryStrategy>> {
    Ok(match choice {
        StrategyChoice::RandomSampling(p) => Box::new(StreamRandomSampling::new(p)?),
        StrategyChoice::FixedUncertainty(p) => {
            let clf = ParzenWindowClassifier::new(p.classifier)?;
            Box::new(FixedUncertainty::new(p.strategy, Box::new(clf))?)
        }
        StrategyChoice::Split(p) => {
            let clf = ParzenWindowClassifier::new(p.classifier)?;
            Box::new(Split::new(p.strategy, Box::new(clf))?)
        }
        StrategyChoice::ForgettingWindow(p) => {
            Box::new(ForgettingWindowWrapper::new(p.window, build_base(p.base)?)?)
        }
        StrategyChoice::BaggingDelay(p) => Box::new(BaggingDelaySimulator::new(
            p.simulator,
            build_base(p.base)?,
            build_label_model(p.classifier)?,
        )?),
        StrategyChoice::FuzzyDelay(p) => Box::new(FuzzyDelaySimulator::new(
            p.simulator,
            build_base(p.base)?,
            build_label_model(p.classifier)?,
        )?),
    })
}

fn build_base(base: Option<Box<StrategyChoice>>) -> Result<Option<Box<dyn StreamQueryStrategy>>> {
    base.map(|b| build_stream_strategy(*b)).transpose()
}

fn build_label_model(
    config: Option<ParzenWindowConfig>,
) -> Result<Option<Box<dyn FrequencyClassifier>>> {
    config
        .map(|c| Ok(Box::new(ParzenWindowClassifier::new(c)?) as Box<dyn FrequencyClassifier>))
        .transpose()
}
