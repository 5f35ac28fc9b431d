use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::error::TreeError;

/// Always votes for the label it is asked about; never learns.
pub struct OracleClassifier {
    header: InstanceHeader,
}

impl OracleClassifier {
    pub fn new(header: InstanceHeader) -> Self {
        Self { header }
    }
}

impl Classifier for OracleClassifier {
    fn get_votes_for_instance(&self, instance: &Instance) -> Result<Vec<f64>, TreeError> {
        let mut v = vec![0.0; self.header.number_of_classes()];
        if let Some(slot) = instance.class_value().and_then(|y| v.get_mut(y)) {
            *slot = 1.0;
        }
        Ok(v)
    }

    fn train_on_instance(&mut self, _instance: &Instance) -> Result<(), TreeError> {
        Ok(())
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn reset(&mut self) {}

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
