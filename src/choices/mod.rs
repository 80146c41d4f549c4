mod experiment;
mod schema;
mod strategy_choice;
mod stream_choice;

pub use experiment::ExperimentConfig;
pub use schema::{kinds, schema_json};
pub use strategy_choice::*;
pub use stream_choice::*;
