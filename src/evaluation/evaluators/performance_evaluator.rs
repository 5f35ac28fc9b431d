use crate::core::instances::Instance;
use crate::evaluation::Measurement;

/// Accumulates test-then-train outcomes and reports metrics on demand.
pub trait PerformanceEvaluator {
    fn reset(&mut self);
    /// Records the votes a learner cast for a labelled instance before
    /// training on it. Unlabelled instances are ignored.
    fn add_result(&mut self, instance: &Instance, votes: &[f64]);
    fn performance(&self) -> Vec<Measurement>;
}
