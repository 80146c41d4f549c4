pub mod budget;
pub mod choices;
pub mod classifiers;
pub mod core;
pub mod error;
pub mod evaluation;
pub mod strategies;
pub mod streams;
pub mod tasks;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
