mod sea;

pub use sea::{SeaConfig, SeaFunction, SeaGenerator};
