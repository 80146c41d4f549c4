pub mod math;
mod probability;

pub use probability::ProbabilityCorrector;
