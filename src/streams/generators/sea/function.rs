use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// SEA concept: class 0 iff `a1 + a2 <= threshold`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SeaFunction {
    F1,
    #[default]
    F2,
    F3,
    F4,
}

impl SeaFunction {
    pub fn threshold(self) -> f64 {
        match self {
            SeaFunction::F1 => 8.0,
            SeaFunction::F2 => 9.0,
            SeaFunction::F3 => 7.0,
            SeaFunction::F4 => 9.5,
        }
    }
}
