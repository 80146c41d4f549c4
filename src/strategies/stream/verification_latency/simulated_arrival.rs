use crate::core::DelayedTrainingData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Label-arrival time assigned to a pending instance whose label is
/// simulated while judging a candidate that arrived at `tx_cand`.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum SimulatedArrival {
    /// `(max(tX_j, ty_j) + tX_cand) / 2` for each pending instance `j`.
    #[default]
    PerInstance,
    /// `(max over all tX, ty + tX_cand) / 2`, shared by every pending instance.
    Global,
}

impl SimulatedArrival {
    pub fn arrival_times(
        &self,
        data: &DelayedTrainingData,
        pending: &[usize],
        tx_cand: f64,
    ) -> Vec<f64> {
        match self {
            SimulatedArrival::PerInstance => pending
                .iter()
                .map(|&j| (data.tx[j].max(data.ty[j]) + tx_cand) / 2.0)
                .collect(),
            SimulatedArrival::Global => {
                let latest = data
                    .tx
                    .iter()
                    .chain(&data.ty)
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                vec![(latest + tx_cand) / 2.0; pending.len()]
            }
        }
    }
}
