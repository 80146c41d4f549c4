mod bagging_delay;
mod delay_wrapper;
mod forgetting;
mod fuzzy_delay;
mod simulated_arrival;

pub use bagging_delay::{BaggingDelayConfig, BaggingDelaySimulator};
pub use delay_wrapper::{DelayWrapperBase, pending_set};
pub use forgetting::{ForgettingWindowConfig, ForgettingWindowWrapper};
pub use fuzzy_delay::{FuzzyDelayConfig, FuzzyDelaySimulator};
pub use simulated_arrival::SimulatedArrival;
