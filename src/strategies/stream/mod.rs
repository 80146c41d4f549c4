mod fixed_uncertainty;
mod query_strategy;
mod random_sampling;
mod split;
pub mod verification_latency;

pub use fixed_uncertainty::{FixedUncertainty, FixedUncertaintyConfig};
pub use query_strategy::{StreamQueryResult, StreamQueryStrategy, validate_stream_query};
pub use random_sampling::{RandomSamplingConfig, StreamRandomSampling};
pub use split::{Split, SplitConfig};

pub(crate) use query_strategy::{check_sampled, first_utility, sample_and_commit};
