use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::error::TreeError;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub struct TrainSpyHandle(Arc<AtomicU64>);
impl TrainSpyHandle {
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Votes for the true label and counts training calls.
pub struct TrainSpyClassifier {
    count: Arc<AtomicU64>,
    header: InstanceHeader,
}

impl TrainSpyClassifier {
    pub fn new(header: InstanceHeader) -> (Self, TrainSpyHandle) {
        let counter = Arc::new(AtomicU64::new(0));
        (
            Self {
                count: counter.clone(),
                header,
            },
            TrainSpyHandle(counter),
        )
    }
}

impl Classifier for TrainSpyClassifier {
    fn get_votes_for_instance(&self, inst: &Instance) -> Result<Vec<f64>, TreeError> {
        let mut v = vec![0.0; self.header.number_of_classes()];
        if let Some(slot) = inst.class_value().and_then(|y| v.get_mut(y)) {
            *slot = 1.0;
        }
        Ok(v)
    }

    fn train_on_instance(&mut self, _inst: &Instance) -> Result<(), TreeError> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn reset(&mut self) {
        self.count.store(0, Ordering::Relaxed);
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
