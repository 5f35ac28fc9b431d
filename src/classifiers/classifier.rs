use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::error::TreeError;
use std::any::Any;

/// The uniform surface evaluation tasks drive a learner through.
pub trait Classifier {
    /// One vote per class; the predicted class is the first maximal vote.
    fn get_votes_for_instance(&self, instance: &Instance) -> Result<Vec<f64>, TreeError>;
    /// Fails with [`TreeError::SchemaMismatch`] for unlabelled instances.
    fn train_on_instance(&mut self, instance: &Instance) -> Result<(), TreeError>;
    fn header(&self) -> &InstanceHeader;
    fn reset(&mut self);
    fn calc_memory_size(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

/// Index of the first maximal vote, `None` when there are no votes.
pub fn predicted_class(votes: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in votes.iter().enumerate() {
        if best.is_none_or(|b| v > votes[b]) {
            best = Some(i);
        }
    }
    best
}
