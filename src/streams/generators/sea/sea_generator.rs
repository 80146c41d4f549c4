use crate::error::{Error, Result};
use crate::streams::generators::sea::SeaFunction;
use crate::streams::{Stream, StreamRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SeaConfig {
    #[serde(default)]
    #[schemars(title = "Function", description = "SEA concept function")]
    pub function: SeaFunction,

    #[serde(default)]
    #[schemars(
        title = "Threshold",
        description = "Overrides the function's threshold, in [0, 20]."
    )]
    pub threshold: Option<f64>,

    #[serde(default)]
    #[schemars(title = "Balance", description = "Alternate classes during generation?")]
    pub balance: bool,

    #[serde(default)]
    #[schemars(
        title = "Noise (%)",
        description = "Percentage of flipped labels",
        range(min = 0, max = 100)
    )]
    pub noise_percentage: u32,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Upper bound on instances; empty = infinite"
    )]
    pub max_instances: Option<usize>,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            function: SeaFunction::default(),
            threshold: None,
            balance: false,
            noise_percentage: 0,
            max_instances: None,
            seed: default_seed(),
        }
    }
}

/// SEA concepts generator: three features uniform in `[0, 10)`, two classes
/// split by the sum of the first two.
#[derive(Debug)]
pub struct SeaGenerator {
    seed: u64,
    rng: StdRng,
    threshold: f64,
    balance_classes: bool,
    next_class_should_be_zero: bool,
    noise_percentage: u32,
    max_instances: Option<usize>,
    produced: usize,
}

impl SeaGenerator {
    pub fn new(config: SeaConfig) -> Result<Self> {
        if config.noise_percentage > 100 {
            return Err(Error::InvalidParameter(
                "noise percentage must be in [0, 100]".into(),
            ));
        }
        let threshold = match config.threshold {
            Some(t) if !(0.0..=20.0).contains(&t) => {
                return Err(Error::InvalidParameter(
                    "threshold must be in [0.0, 20.0] for attributes in [0, 10)".into(),
                ));
            }
            Some(t) => t,
            None => config.function.threshold(),
        };
        Ok(Self {
            seed: config.seed,
            rng: StdRng::seed_from_u64(config.seed),
            threshold,
            balance_classes: config.balance,
            next_class_should_be_zero: false,
            noise_percentage: config.noise_percentage,
            max_instances: config.max_instances,
            produced: 0,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    fn gen_attr(&mut self) -> f64 {
        self.rng.random_range(0.0..10.0)
    }

    #[inline]
    fn determine_class(&self, a1: f64, a2: f64) -> u8 {
        if a1 + a2 <= self.threshold { 0 } else { 1 }
    }

    #[inline]
    fn maybe_flip_with_noise(&mut self, cls: u8) -> u8 {
        let roll: u32 = self.rng.random_range(1..=100);
        if roll <= self.noise_percentage {
            1 - cls
        } else {
            cls
        }
    }
}

impl Stream for SeaGenerator {
    fn n_features(&self) -> usize {
        3
    }

    fn n_classes(&self) -> usize {
        2
    }

    fn has_more_instances(&self) -> bool {
        self.max_instances.is_none_or(|max| self.produced < max)
    }

    fn next_record(&mut self) -> Option<StreamRecord> {
        if !self.has_more_instances() {
            return None;
        }

        let (x, cls) = loop {
            let x = [self.gen_attr(), self.gen_attr(), self.gen_attr()];
            let g = self.determine_class(x[0], x[1]);
            if !self.balance_classes {
                break (x, g);
            }
            let want_zero = self.next_class_should_be_zero;
            if want_zero == (g == 0) {
                self.next_class_should_be_zero = !want_zero;
                break (x, g);
            }
        };

        let cls = self.maybe_flip_with_noise(cls);
        self.produced += 1;
        Some(StreamRecord::new(x.to_vec(), cls as f64))
    }

    fn restart(&mut self) -> Result<()> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        self.next_class_should_be_zero = false;
        Ok(())
    }
}
