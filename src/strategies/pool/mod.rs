mod badge;
mod selection_probability;

pub use badge::{Badge, BadgeConfig, BadgeQuery, PoolCandidates};
pub use selection_probability::{SelectionProbability, distance_probability};
