/// Online scalar estimator fed one observation at a time.
pub trait Estimator {
    /// Incorporates a new observation. `NaN` marks an observation that could
    /// not be made and is ignored.
    fn add(&mut self, v: f64);

    /// Current estimate, `NaN` before the first observation.
    fn estimation(&self) -> f64;

    /// Number of observations taken into account.
    fn count(&self) -> u64;
}
